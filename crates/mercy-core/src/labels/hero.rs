use super::Label;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Playable heroes, plus the `NoHero` sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Hero {
    Ana,
    Ashe,
    Baptiste,
    Bastion,
    Brigitte,
    #[serde(rename = "D.Va")]
    DVa,
    Doomfist,
    Echo,
    Genji,
    Hanzo,
    Junkrat,
    Lucio,
    Mccree,
    Mei,
    Mercy,
    Moira,
    Orisa,
    Pharah,
    Reaper,
    Reinhardt,
    Roadhog,
    Sigma,
    #[serde(rename = "Soldier: 76")]
    Soldier76,
    Sombra,
    Symmetra,
    Torbjorn,
    Tracer,
    Widowmaker,
    Winston,
    #[serde(rename = "Wrecking Ball")]
    WreckingBall,
    Zarya,
    Zenyatta,
    #[serde(rename = "No Hero")]
    NoHero,
}

impl Hero {
    pub const COUNT: usize = 33;
}

const HEROES: [Hero; Hero::COUNT] = [
    Hero::Ana,
    Hero::Ashe,
    Hero::Baptiste,
    Hero::Bastion,
    Hero::Brigitte,
    Hero::DVa,
    Hero::Doomfist,
    Hero::Echo,
    Hero::Genji,
    Hero::Hanzo,
    Hero::Junkrat,
    Hero::Lucio,
    Hero::Mccree,
    Hero::Mei,
    Hero::Mercy,
    Hero::Moira,
    Hero::Orisa,
    Hero::Pharah,
    Hero::Reaper,
    Hero::Reinhardt,
    Hero::Roadhog,
    Hero::Sigma,
    Hero::Soldier76,
    Hero::Sombra,
    Hero::Symmetra,
    Hero::Torbjorn,
    Hero::Tracer,
    Hero::Widowmaker,
    Hero::Winston,
    Hero::WreckingBall,
    Hero::Zarya,
    Hero::Zenyatta,
    Hero::NoHero,
];

impl Label for Hero {
    const ALL: &'static [Self] = &HEROES;
    const NONE: Self = Hero::NoHero;

    fn name(&self) -> &'static str {
        match self {
            Hero::Ana => "Ana",
            Hero::Ashe => "Ashe",
            Hero::Baptiste => "Baptiste",
            Hero::Bastion => "Bastion",
            Hero::Brigitte => "Brigitte",
            Hero::DVa => "D.Va",
            Hero::Doomfist => "Doomfist",
            Hero::Echo => "Echo",
            Hero::Genji => "Genji",
            Hero::Hanzo => "Hanzo",
            Hero::Junkrat => "Junkrat",
            Hero::Lucio => "Lucio",
            Hero::Mccree => "Mccree",
            Hero::Mei => "Mei",
            Hero::Mercy => "Mercy",
            Hero::Moira => "Moira",
            Hero::Orisa => "Orisa",
            Hero::Pharah => "Pharah",
            Hero::Reaper => "Reaper",
            Hero::Reinhardt => "Reinhardt",
            Hero::Roadhog => "Roadhog",
            Hero::Sigma => "Sigma",
            Hero::Soldier76 => "Soldier: 76",
            Hero::Sombra => "Sombra",
            Hero::Symmetra => "Symmetra",
            Hero::Torbjorn => "Torbjorn",
            Hero::Tracer => "Tracer",
            Hero::Widowmaker => "Widowmaker",
            Hero::Winston => "Winston",
            Hero::WreckingBall => "Wrecking Ball",
            Hero::Zarya => "Zarya",
            Hero::Zenyatta => "Zenyatta",
            Hero::NoHero => "No Hero",
        }
    }
}

impl fmt::Display for Hero {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
