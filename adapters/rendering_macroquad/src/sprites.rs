use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use macroquad::{
    color::WHITE,
    math::Vec2 as MacroquadVec2,
    texture::{self, DrawTextureParams, Texture2D},
};

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Cache of textures loaded from a sprite manifest, keyed by sprite name.
#[derive(Debug)]
pub(crate) struct SpriteAtlas {
    textures: HashMap<String, Texture2D>,
}

impl SpriteAtlas {
    /// Loads sprites from the manifest located at the provided path.
    pub(crate) fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Draws `name` with its top-left corner at `position`.
    ///
    /// `scale` multiplies the texture's native size and `rotation_degrees`
    /// turns it around its centre. Unknown sprites are skipped.
    pub(crate) fn draw(&self, name: &str, position: Vec2, scale: f32, rotation_degrees: f32) {
        let Some(texture) = self.textures.get(name).copied() else {
            return;
        };

        let dest_size = MacroquadVec2::new(texture.width() * scale, texture.height() * scale);
        let pivot = MacroquadVec2::new(
            position.x + dest_size.x / 2.0,
            position.y + dest_size.y / 2.0,
        );
        let params = DrawTextureParams {
            dest_size: Some(dest_size),
            rotation: rotation_degrees.to_radians(),
            pivot: Some(pivot),
            ..DrawTextureParams::default()
        };
        texture::draw_texture_ex(texture, position.x, position.y, WHITE, params);
    }

    /// Returns whether the atlas contains the provided sprite.
    #[must_use]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }

    /// Returns the number of textures stored in the atlas.
    #[must_use]
    pub(crate) fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn from_manifest_with_loader(
        path: impl AsRef<Path>,
        mut loader: impl FnMut(&str, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read sprite manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let entries = parse_manifest(&contents, &base)?;
        Self::from_entries(entries, &mut loader)
    }

    fn from_entries(
        entries: Vec<(String, PathBuf)>,
        loader: &mut impl FnMut(&str, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let mut textures = HashMap::with_capacity(entries.len());
        for (name, path) in entries {
            let texture = loader(&name, &path).with_context(|| {
                format!("failed to load sprite `{name}` from {}", path.display())
            })?;
            if textures.insert(name.clone(), texture).is_some() {
                bail!("duplicate sprite entry for `{name}`");
            }
        }
        Ok(Self { textures })
    }
}

fn default_loader(_name: &str, path: &Path) -> Result<Texture2D> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read sprite asset at {}", path.display()))?;
    Ok(Texture2D::from_file_with_format(&bytes, None))
}

fn default_manifest_version() -> u32 {
    SUPPORTED_MANIFEST_VERSION
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    #[serde(default = "default_manifest_version")]
    version: u32,
    sprites: HashMap<String, String>,
}

/// Resolves manifest entries relative to `base_path`, sorted by sprite name.
fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<(String, PathBuf)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse sprite manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sprite manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut entries = Vec::with_capacity(manifest.sprites.len());
    for (name, relative_path) in manifest.sprites {
        if name.trim().is_empty() {
            bail!("sprite manifest contains an entry with an empty name");
        }
        entries.push((name, base_path.join(relative_path)));
    }
    entries.sort_by(|left, right| left.0.cmp(&right.0));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn manifest_resolves_paths_relative_to_base_directory() {
        let manifest = r#"
            [sprites]
            ufo = "enemies/ufo.png"
            rover = "rover.png"
        "#;

        let parsed = parse_manifest(manifest, Path::new("root")).expect("manifest should parse");
        assert_eq!(
            parsed,
            vec![
                ("rover".to_owned(), PathBuf::from("root/rover.png")),
                ("ufo".to_owned(), PathBuf::from("root/enemies/ufo.png")),
            ]
        );
    }

    #[test]
    fn manifest_rejects_unknown_versions() {
        let manifest = r#"
            version = 2

            [sprites]
            rover = "rover.png"
        "#;

        assert!(parse_manifest(manifest, Path::new("assets")).is_err());
    }

    #[test]
    fn manifest_requires_a_sprite_table() {
        assert!(parse_manifest("version = 1", Path::new("assets")).is_err());
    }

    #[test]
    fn atlas_loads_each_entry_once_in_name_order() {
        let manifest = r#"
            version = 1

            [sprites]
            tire = "tire.png"
            city = "city.png"
            rover = "rover.png"
        "#;
        let entries = parse_manifest(manifest, Path::new("assets")).expect("manifest parses");
        let load_order = RefCell::new(Vec::new());
        let atlas = SpriteAtlas::from_entries(entries, &mut |name, _| {
            load_order.borrow_mut().push(name.to_owned());
            Ok(Texture2D::empty())
        })
        .expect("atlas should load using provided loader");

        assert_eq!(load_order.into_inner(), vec!["city", "rover", "tire"]);
        assert_eq!(atlas.texture_count(), 3);
        assert!(atlas.contains("rover"));
        assert!(!atlas.contains("ufo"));
    }

    #[test]
    fn loader_failures_name_the_sprite() {
        let entries = vec![("stars".to_owned(), PathBuf::from("missing.png"))];
        let error = SpriteAtlas::from_entries(entries, &mut |_, _| bail!("no such file"))
            .expect_err("loader failure propagates");
        assert!(format!("{error:#}").contains("`stars`"));
    }
}
