use std::{io, path::Path};

use serde::Serialize;

use crate::spreet::Density;

#[derive(Serialize, Debug)]
pub struct BuildInfo {
    pub sprite_name: String,
    pub total_pois: usize,
    pub mapped_pois: usize,
    pub staged_pois: usize,
    pub output_dir: String,
    pub files: Vec<String>,
}

impl BuildInfo {
    pub fn new(
        sprite_name: &str,
        total_pois: usize,
        mapped_pois: usize,
        staged_pois: usize,
        output_dir: &Path,
    ) -> Self {
        Self {
            sprite_name: sprite_name.to_string(),
            total_pois,
            mapped_pois,
            staged_pois,
            output_dir: output_dir.display().to_string(),
            files: sprite_files(sprite_name),
        }
    }
}

/// `poi.png`, `poi.json`, `poi@2x.png`, `poi@2x.json`
pub fn sprite_files(sprite_name: &str) -> Vec<String> {
    Density::ALL
        .iter()
        .flat_map(|d| {
            let name = d.output_name(sprite_name);
            [format!("{name}.png"), format!("{name}.json")]
        })
        .collect()
}

pub fn readme(info: &BuildInfo, url_base: &str) -> String {
    let name = &info.sprite_name;
    let url_base = url_base.trim_end_matches('/');

    format!(
        r#"# POI Sprites

Generated sprites for the PMTiles POI layer.

## Files

- `{name}.png` - sprite sheet (1x)
- `{name}.json` - sprite metadata (1x)
- `{name}@2x.png` - sprite sheet (2x retina)
- `{name}@2x.json` - sprite metadata (2x)

## MapLibre usage

```json
{{
  "sprite": "{url_base}/{name}",
  "layers": [
    {{
      "id": "poi-icons",
      "type": "symbol",
      "source": "pmtiles",
      "source-layer": "poi",
      "layout": {{
        "icon-image": ["get", "class"],
        "icon-size": 0.8
      }}
    }}
  ]
}}
```

## Mapped POI types: {mapped}

Based on Font Awesome Free icons.
"#,
        mapped = info.mapped_pois,
    )
}

/// Writes `README.md` into the output directory and `build_info.json` to `info_path`
pub fn write_docs(
    info: &BuildInfo,
    url_base: &str,
    output_dir: &Path,
    info_path: &Path,
) -> io::Result<()> {
    let readme_path = output_dir.join("README.md");
    std::fs::write(&readme_path, readme(info, url_base))?;
    tracing::info!(path = ?readme_path, "readme written");

    let json = serde_json::to_string_pretty(info)?;
    std::fs::write(info_path, json + "\n")?;
    tracing::info!(path = ?info_path, "build info written");

    Ok(())
}
