use super::Label;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weapon actions a hero can be seen performing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeaponAction {
    #[serde(rename = "Holding Staff")]
    HoldingStaff,
    #[serde(rename = "Holding Pistol")]
    HoldingPistol,
    Firing,
    Melee,
    Healing,
    #[serde(rename = "Damage Boosting")]
    DamageBoosting,
    #[serde(rename = "No Action")]
    NoAction,
}

const ACTIONS: [WeaponAction; 7] = [
    WeaponAction::HoldingStaff,
    WeaponAction::HoldingPistol,
    WeaponAction::Firing,
    WeaponAction::Melee,
    WeaponAction::Healing,
    WeaponAction::DamageBoosting,
    WeaponAction::NoAction,
];

impl Label for WeaponAction {
    const ALL: &'static [Self] = &ACTIONS;
    const NONE: Self = WeaponAction::NoAction;

    fn name(&self) -> &'static str {
        match self {
            WeaponAction::HoldingStaff => "Holding Staff",
            WeaponAction::HoldingPistol => "Holding Pistol",
            WeaponAction::Firing => "Firing",
            WeaponAction::Melee => "Melee",
            WeaponAction::Healing => "Healing",
            WeaponAction::DamageBoosting => "Damage Boosting",
            WeaponAction::NoAction => "No Action",
        }
    }
}

impl fmt::Display for WeaponAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
