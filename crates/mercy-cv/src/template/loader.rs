//! Template loading utilities

use super::{PreprocessingParams, Template};
use crate::utils::{ImageUtils, Region};
use crate::Result;
use anyhow::{bail, Context};
use image::GrayImage;
use mercy_core::{csv, Hero, Label, WeaponAction};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Subdirectory holding weapon-action templates
pub const WEAPON_ACTION_DIR: &str = "Weapon_Actions";

/// Suffix of precomputed edge-map templates
pub const EDGE_SUFFIX: &str = "_Edge";

/// One weapon-action template and where to look for it
#[derive(Debug, Clone)]
pub struct ActionTemplate {
    pub action: WeaponAction,
    pub image: GrayImage,
    pub region: Region,
}

/// Template loader with multiple search strategies
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    template_dirs: Vec<PathBuf>,
    supported_extensions: Vec<String>,
}

impl TemplateLoader {
    pub fn new() -> Self {
        Self {
            template_dirs: Vec::new(),
            supported_extensions: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "bmp".to_string(),
            ],
        }
    }

    /// Add template directory
    pub fn add_template_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.template_dirs.push(dir.as_ref().to_path_buf());
        self
    }

    /// Loader over the weapon-action subdirectory of every template directory
    pub fn weapon_action_loader(&self) -> Self {
        Self {
            template_dirs: self
                .template_dirs
                .iter()
                .map(|dir| dir.join(WEAPON_ACTION_DIR))
                .collect(),
            supported_extensions: self.supported_extensions.clone(),
        }
    }

    /// Load template by name with multiple search strategies
    pub fn load_template(&self, name: &str) -> Result<Option<Template>> {
        for candidate in self.generate_template_candidates(name) {
            if let Some(path) = self.find_template_file(&candidate)? {
                let image = ImageUtils::load_grayscale(&path)
                    .with_context(|| format!("Failed to load template: {:?}", path))?;
                debug!("Loaded template {} from {:?}", name, path);

                return Ok(Some(Template::new(name.to_string(), image)));
            }
        }

        Ok(None)
    }

    /// Load the precomputed edge map of a template (`<name>_Edge`)
    pub fn load_edge_template(&self, name: &str) -> Result<Option<Template>> {
        self.load_template(&format!("{}{}", name, EDGE_SUFFIX))
    }

    /// Weapon template of each hero, in the given order; missing heroes are skipped
    pub fn load_hero_templates(&self, heroes: &[Hero], edge: bool) -> Result<Vec<(Hero, GrayImage)>> {
        let mut templates = Vec::with_capacity(heroes.len());

        for &hero in heroes {
            let template = if edge {
                self.load_edge_template(hero.name())?
            } else {
                self.load_template(hero.name())?
            };

            match template {
                Some(template) => templates.push((hero, template.image)),
                None => warn!("No template found for hero {}", hero),
            }
        }

        Ok(templates)
    }

    /// Load all templates from directories
    pub fn load_all_templates(&self) -> Result<Vec<Template>> {
        let mut templates = Vec::new();

        for dir in &self.template_dirs {
            if !dir.exists() {
                continue;
            }

            let mut paths: Vec<PathBuf> = fs::read_dir(dir)
                .with_context(|| format!("Failed to read directory: {:?}", dir))?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<_>>()?;
            paths.sort();

            for path in paths {
                if !self.is_supported(&path) {
                    continue;
                }
                if let Some(stem) = path.file_stem() {
                    let name = stem.to_string_lossy().to_string();
                    let image = ImageUtils::load_grayscale(&path)?;

                    templates.push(Template::new(name, image));
                }
            }
        }

        Ok(templates)
    }

    /// Write `<name>_Edge.png` for every plain template into `out_dir`
    ///
    /// Templates that already carry the edge suffix are skipped. Returns the
    /// written paths in load order.
    pub fn export_edge_templates<P: AsRef<Path>>(
        &self,
        params: &PreprocessingParams,
        out_dir: P,
    ) -> Result<Vec<PathBuf>> {
        let out_dir = out_dir.as_ref();
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create directory: {:?}", out_dir))?;

        let mut written = Vec::new();
        for template in self.load_all_templates()? {
            if template.name.ends_with(EDGE_SUFFIX) {
                continue;
            }

            let edges = ImageUtils::edge_map(
                &template.image,
                params.canny_low,
                params.canny_high,
                params.blur_radius,
            );
            let path = out_dir.join(format!("{}{}.png", template.name, EDGE_SUFFIX));
            ImageUtils::save_image(&edges, &path)?;
            debug!("Wrote edge template {:?}", path);
            written.push(path);
        }

        info!("Exported {} edge templates to {:?}", written.len(), out_dir);
        Ok(written)
    }

    /// Parse the weapon-action index and load its templates
    ///
    /// A row with a single field names the hero for the rows below it. Entry
    /// rows are `file, action, x, y, w, h`. Malformed rows and entries whose
    /// image is missing are skipped with a warning.
    pub fn load_action_index<P: AsRef<Path>>(
        &self,
        index_path: P,
        edge: bool,
    ) -> Result<HashMap<Hero, Vec<ActionTemplate>>> {
        let index_path = index_path.as_ref();
        let rows = csv::load(index_path)?;
        if rows.is_empty() {
            bail!("Weapon action index {:?} is empty", index_path);
        }

        let action_loader = self.weapon_action_loader();
        let mut index: HashMap<Hero, Vec<ActionTemplate>> = HashMap::new();
        let mut current: Option<Hero> = None;

        for (line, row) in rows.iter().enumerate() {
            if row.len() == 1 {
                current = match Hero::parse_name(&row[0]) {
                    Ok(hero) => {
                        index.entry(hero).or_default();
                        Some(hero)
                    }
                    Err(e) => {
                        warn!("Row {} of {:?}: {}", line + 1, index_path, e);
                        None
                    }
                };
                continue;
            }

            let Some(hero) = current else {
                warn!("Row {} of {:?}: entry without a hero header", line + 1, index_path);
                continue;
            };

            let Some((file, action, region)) = parse_entry(row) else {
                warn!("Row {} of {:?}: malformed entry {:?}", line + 1, index_path, row);
                continue;
            };

            let template = if edge {
                action_loader.load_edge_template(file)?
            } else {
                action_loader.load_template(file)?
            };

            match template {
                Some(template) => index.entry(hero).or_default().push(ActionTemplate {
                    action,
                    image: template.image,
                    region,
                }),
                None => warn!("Missing weapon action template {} for {}", file, hero),
            }
        }

        info!(
            "Loaded weapon action templates for {} heroes from {:?}",
            index.len(),
            index_path
        );
        Ok(index)
    }

    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.supported_extensions.contains(&ext))
    }

    /// Generate template name candidates
    fn generate_template_candidates(&self, name: &str) -> Vec<String> {
        let compact: String = name.chars().filter(|c| c.is_alphanumeric() || *c == '_').collect();
        let underscored = name.replace(' ', "_").replace([':', '.'], "");
        let mut stems = vec![name.to_string(), compact, underscored];
        stems.dedup();

        let mut candidates = Vec::new();
        for ext in &self.supported_extensions {
            for stem in &stems {
                candidates.push(format!("{}.{}", stem, ext));
                candidates.push(format!("{}.{}", stem.to_lowercase(), ext));
                candidates.push(format!("_{}.{}", stem, ext));
            }
        }

        candidates
    }

    /// Find template file in directories
    fn find_template_file(&self, candidate: &str) -> Result<Option<PathBuf>> {
        for dir in &self.template_dirs {
            let path = dir.join(candidate);
            if path.is_file() {
                return Ok(Some(path));
            }

            // Case-insensitive search
            if let Ok(entries) = fs::read_dir(dir) {
                for entry in entries.flatten() {
                    if entry.file_name().to_string_lossy().eq_ignore_ascii_case(candidate) {
                        return Ok(Some(entry.path()));
                    }
                }
            }
        }

        Ok(None)
    }
}

impl Default for TemplateLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_entry(row: &[String]) -> Option<(&str, WeaponAction, Region)> {
    if row.len() < 6 {
        return None;
    }

    let action = WeaponAction::parse_name(&row[1]).ok()?;
    let mut coords = row[2..6].iter().map(|v| v.parse::<u32>().ok());
    let region = Region::new(coords.next()??, coords.next()??, coords.next()??, coords.next()??);

    Some((row[0].as_str(), action, region))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use std::fs;

    fn write_template(path: &Path, shade: u8) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        GrayImage::from_pixel(6, 4, Luma([shade])).save(path)?;
        Ok(())
    }

    #[test]
    fn test_load_template_case_insensitive() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_template(&dir.path().join("MERCY.PNG"), 10)?;

        let loader = TemplateLoader::new().add_template_dir(dir.path());
        let template = loader.load_template("Mercy")?.expect("template present");
        assert_eq!(template.name, "Mercy");
        assert_eq!(template.image.dimensions(), (6, 4));
        assert!(loader.load_template("Lucio")?.is_none());
        Ok(())
    }

    #[test]
    fn test_hero_templates_keep_order_and_skip_missing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_template(&dir.path().join("Lucio.png"), 10)?;
        write_template(&dir.path().join("Mercy.png"), 20)?;
        write_template(&dir.path().join("Mercy_Edge.png"), 255)?;

        let loader = TemplateLoader::new().add_template_dir(dir.path());
        let plain = loader.load_hero_templates(&[Hero::Mercy, Hero::Ana, Hero::Lucio], false)?;
        let heroes: Vec<Hero> = plain.iter().map(|(h, _)| *h).collect();
        assert_eq!(heroes, vec![Hero::Mercy, Hero::Lucio]);

        let edges = loader.load_hero_templates(&[Hero::Mercy, Hero::Lucio], true)?;
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].1.get_pixel(0, 0), &Luma([255]));
        Ok(())
    }

    #[test]
    fn test_load_action_index() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let actions = dir.path().join(WEAPON_ACTION_DIR);
        write_template(&actions.join("mercy_staff.png"), 30)?;
        write_template(&actions.join("mercy_pistol.png"), 40)?;
        write_template(&actions.join("lucio_heal.png"), 50)?;

        let index_path = dir.path().join("index.csv");
        fs::write(
            &index_path,
            "Mercy\n\
             mercy_staff, Holding Staff, 10, 20, 30, 40\n\
             mercy_pistol, Holding Pistol, 1, 2, 3, 4\n\
             mercy_gone, Healing, 1, 2, 3, 4\n\
             mercy_bad, Healing, 1, x, 3, 4\n\
             Lucio\n\
             lucio_heal, Healing, 5, 6, 7, 8\n",
        )?;

        let loader = TemplateLoader::new().add_template_dir(dir.path());
        let index = loader.load_action_index(&index_path, false)?;

        let mercy = &index[&Hero::Mercy];
        assert_eq!(mercy.len(), 2);
        assert_eq!(mercy[0].action, WeaponAction::HoldingStaff);
        assert_eq!(mercy[0].region, Region::new(10, 20, 30, 40));
        assert_eq!(mercy[1].action, WeaponAction::HoldingPistol);

        let lucio = &index[&Hero::Lucio];
        assert_eq!(lucio.len(), 1);
        assert_eq!(lucio[0].action, WeaponAction::Healing);
        Ok(())
    }

    #[test]
    fn test_entries_before_header_are_skipped() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let index_path = dir.path().join("index.csv");
        fs::write(&index_path, "orphan, Firing, 1, 2, 3, 4\n")?;

        let index = TemplateLoader::new()
            .add_template_dir(dir.path())
            .load_action_index(&index_path, false)?;
        assert!(index.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_all_templates_filters_extensions() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_template(&dir.path().join("b.png"), 1)?;
        write_template(&dir.path().join("a.png"), 2)?;
        fs::write(dir.path().join("notes.txt"), "not an image")?;

        let templates = TemplateLoader::new().add_template_dir(dir.path()).load_all_templates()?;
        let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        Ok(())
    }

    #[test]
    fn test_export_edge_templates() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let square = GrayImage::from_fn(24, 24, |x, y| {
            if (6..18).contains(&x) && (6..18).contains(&y) {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        square.save(dir.path().join("Mercy.png"))?;
        write_template(&dir.path().join("Lucio_Edge.png"), 255)?;

        let out = dir.path().join("edges");
        let loader = TemplateLoader::new().add_template_dir(dir.path());
        let written = loader.export_edge_templates(&PreprocessingParams::default(), &out)?;
        assert_eq!(written, vec![out.join("Mercy_Edge.png")]);

        let edges = TemplateLoader::new().add_template_dir(&out).load_edge_template("Mercy")?;
        let edges = edges.expect("edge template written");
        assert_eq!(edges.image.dimensions(), (24, 24));
        assert!(edges.image.pixels().any(|p| p[0] == 255));
        assert_eq!(edges.image.get_pixel(12, 12), &Luma([0]));
        Ok(())
    }
}
