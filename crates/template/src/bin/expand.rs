//! Shader template expansion tool
//!
//! Prints a shader source with all includes expanded, optionally prefixing
//! every line with the file and line it came from.
//!
//! # Usage
//! ```bash
//! expand shaders /gpu/comp.glsl --thread-count 256 --map
//! ```

use clap::Parser;
use shader_program_template::{DirectorySource, TemplateConfig, standard_template};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Expand includes of a GLSL shader template")]
struct Args {
    /// Directory include paths are resolved against
    root: PathBuf,

    /// Source to expand, e.g. /gpu/vert.glsl
    name: String,

    /// Template configuration YAML; flags below override its values
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Directive emitted for <version_header>
    #[arg(long)]
    version_header: Option<String>,

    /// THREAD_COUNT emitted for <thread_config>
    #[arg(long)]
    thread_count: Option<u32>,

    /// FACES_PER_THREAD emitted for <thread_config>
    #[arg(long)]
    faces_per_thread: Option<u32>,

    /// Prefix each line with its logical file:line
    #[arg(long, short)]
    map: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = tracing_subscriber::fmt().with_writer(std::io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TemplateConfig::from_file(path)?,
        None => TemplateConfig::default(),
    };
    if let Some(version_header) = args.version_header {
        config.version_header = version_header;
    }
    if let Some(thread_count) = args.thread_count {
        config.thread_count = thread_count;
    }
    if let Some(faces_per_thread) = args.faces_per_thread {
        config.faces_per_thread = faces_per_thread;
    }
    config.validate()?;

    let template = standard_template(&config, DirectorySource::new(&args.root));
    let source = template.load(&args.name)?;

    if args.map {
        let width = source.origins().iter().map(|origin| origin.file.len() + origin.line.to_string().len() + 1).max().unwrap_or(0);
        for (line, origin) in source.contents().lines().zip(source.origins()) {
            let location = format!("{}:{}", origin.file, origin.line);
            println!("{location:<width$} | {line}");
        }
    } else {
        print!("{}", source.contents());
    }

    Ok(())
}
