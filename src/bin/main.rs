//! Skin Mesher CLI
//!
//! Generate 3D models from Minecraft skin atlases.

use clap::{Parser, Subcommand, ValueEnum};
use skin_mesher::{
    export_glb, export_json, load_atlas, map_face_to_uv, unwrap_box, Face, MesherConfig,
    ObjExport, SkinLayout, SkinMesher,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(name = "skin-mesher")]
#[command(author, version, about = "Generate 3D models from Minecraft skin atlases", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a model from a skin and export it
    Mesh {
        /// Skin PNG (64x64)
        #[arg(short, long)]
        skin: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "glb")]
        format: OutputFormat,

        /// Part layout: "classic", "slim" or a path to a JSON layout file
        #[arg(long, default_value = "classic")]
        layout: String,

        /// Skip overlay shells
        #[arg(long)]
        no_overlay: bool,

        /// Overlay inflation in model units (must be positive)
        #[arg(long, default_value = "0.5", value_parser = parse_inflation)]
        inflation: f32,
    },

    /// Show the atlas regions each part reads from
    Inspect {
        /// Skin PNG (64x64)
        #[arg(short, long)]
        skin: PathBuf,

        /// Part layout: "classic", "slim" or a path to a JSON layout file
        #[arg(long, default_value = "classic")]
        layout: String,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Binary glTF format
    Glb,
    /// Wavefront OBJ format
    Obj,
    /// Model descriptor as JSON
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .without_time()
        .compact()
        .init();

    match cli.command {
        Commands::Mesh {
            skin,
            output,
            format,
            layout,
            no_overlay,
            inflation,
        } => {
            let config = MesherConfig::default()
                .with_overlay(!no_overlay)
                .with_inflation(inflation);
            mesh_skin(&skin, &output, format, &layout, config)?;
        }
        Commands::Inspect { skin, layout } => {
            inspect_skin(&skin, &layout)?;
        }
    }

    Ok(())
}

fn parse_inflation(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("inflation must be a positive number, got {}", s))
    }
}

fn resolve_layout(name: &str) -> skin_mesher::Result<SkinLayout> {
    match name.to_ascii_lowercase().as_str() {
        "classic" | "steve" => Ok(SkinLayout::classic()),
        "slim" | "alex" => Ok(SkinLayout::slim()),
        _ => SkinLayout::load(name),
    }
}

fn mesh_skin(
    skin_path: &Path,
    output_path: &Path,
    format: OutputFormat,
    layout: &str,
    config: MesherConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading skin from {:?}...", skin_path);
    let atlas = load_atlas(skin_path)?;
    let layout = resolve_layout(layout)?;
    println!("  Layout has {} parts", layout.len());

    println!("Meshing with config:");
    println!("  - Overlay: {}", config.include_overlay);
    if config.include_overlay {
        println!("  - Overlay inflation: {}", config.overlay_inflation);
    }

    let mut mesher = SkinMesher::with_config(layout, config);
    let model = mesher.assemble(&atlas)?;

    println!(
        "  Generated {} parts, {} boxes, {} triangles",
        model.len(),
        model.box_count(),
        model.base_mesh().triangle_count() + model.overlay_mesh().triangle_count()
    );

    let name = output_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("skin");

    match format {
        OutputFormat::Glb => {
            let glb_path = with_default_extension(output_path, "glb");
            let glb_data = export_glb(model, &atlas)?;
            fs::write(&glb_path, &glb_data)?;
            println!("Exported GLB ({} bytes) to {:?}", glb_data.len(), glb_path);
        }
        OutputFormat::Obj => {
            let obj_export = ObjExport::from_model(model, &atlas, name)?;

            let obj_path = with_default_extension(output_path, "obj");
            let mtl_path = obj_path.with_extension("mtl");
            let png_path = obj_path.with_file_name(ObjExport::texture_filename(name));

            fs::write(&obj_path, &obj_export.obj)?;
            fs::write(&mtl_path, &obj_export.mtl)?;
            fs::write(&png_path, &obj_export.texture_png)?;

            println!("Exported OBJ to {:?}", obj_path);
            println!("  Material: {:?}", mtl_path);
            println!("  Texture: {:?}", png_path);
        }
        OutputFormat::Json => {
            let json_path = with_default_extension(output_path, "json");
            fs::write(&json_path, export_json(model)?)?;
            println!("Exported model JSON to {:?}", json_path);
        }
    }

    Ok(())
}

fn inspect_skin(skin_path: &Path, layout: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading skin from {:?}...", skin_path);
    let atlas = load_atlas(skin_path)?;
    let layout = resolve_layout(layout)?;

    println!("\nSkin Info:");
    println!("  Size: {}x{}", atlas.width(), atlas.height());
    println!("  Transparent texels: {}", atlas.has_transparency());

    for part in layout.parts() {
        let [w, h, d] = part.dimensions;
        println!("\n{} ({}x{}x{}, offset {:?})", part.name, w, h, d, part.offset);

        let base =
            unwrap_box(part.base_origin, part.dimensions).map_err(|e| e.with_part(&part.name))?;
        let overlay = part
            .overlay_origin
            .map(|o| unwrap_box(o, part.dimensions))
            .transpose()
            .map_err(|e| e.with_part(&part.name))?;
        for face in Face::ALL {
            let rect = base.get(face);
            let uv = map_face_to_uv(rect).map_err(|e| e.in_part(&part.name, face))?;
            print!(
                "  {:<6} base {}  uv [{:.4}, {:.4}]-[{:.4}, {:.4}]",
                face.name(),
                rect,
                uv.u0(),
                uv.v0(),
                uv.u1(),
                uv.v1()
            );
            match &overlay {
                Some(overlay) => println!("  overlay {}", overlay.get(face)),
                None => println!(),
            }
        }
    }

    Ok(())
}

fn with_default_extension(path: &Path, ext: &str) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(ext)
    }
}
