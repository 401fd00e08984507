use std::path::PathBuf;

use anyhow::{Context, bail};
use maya_header::helpers::hex_rows;
use maya_header::{MetaKind, SceneFile, SceneHeader, UnitKind};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: mayahead <scene.mb|scene.ma> <command> [args] [-o <out>]

commands:
  info
  get-fileinfo <key>        set-fileinfo <key> <value>    remove-fileinfo <key>
  get-plugin <name>         set-plugin <name> <version>   remove-plugin <name>
  get-version               set-version <year>
  dump";

fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let output = take_output(&mut args)?;

    let [path, command, rest @ ..] = args.as_slice() else {
        bail!("{USAGE}");
    };

    let mut scene = SceneFile::open(path).with_context(|| format!("failed to open {path}"))?;
    let mutated = run(&mut scene, command, rest)?;

    if mutated {
        match output {
            Some(out) => scene.save_as(&out)?,
            None => scene.save()?,
        }
    }
    Ok(())
}

/// Runs one command; returns whether the header changed.
fn run(scene: &mut SceneFile, command: &str, args: &[String]) -> anyhow::Result<bool> {
    match (command, args) {
        ("info", []) => {
            print_info(scene);
            Ok(false)
        }
        ("get-fileinfo", [key]) => {
            print_value(scene.fileinfo(key));
            Ok(false)
        }
        ("set-fileinfo", [key, value]) => {
            scene.set_fileinfo(key, value)?;
            Ok(true)
        }
        ("remove-fileinfo", [key]) => Ok(scene.remove_fileinfo(key).is_some()),
        ("get-plugin", [name]) => {
            print_value(scene.plugin(name));
            Ok(false)
        }
        ("set-plugin", [name, version]) => {
            scene.set_plugin(name, version)?;
            Ok(true)
        }
        ("remove-plugin", [name]) => Ok(scene.remove_plugin(name).is_some()),
        ("get-version", []) => {
            print_value(scene.maya_version().map(|v| v.to_string()));
            Ok(false)
        }
        ("set-version", [version]) => {
            let version: u32 = version
                .parse()
                .with_context(|| format!("version must be a number, got {version:?}"))?;
            scene.set_maya_version(version);
            Ok(true)
        }
        ("dump", []) => {
            dump(scene)?;
            Ok(false)
        }
        _ => bail!("{USAGE}"),
    }
}

fn take_output(args: &mut Vec<String>) -> anyhow::Result<Option<PathBuf>> {
    let Some(index) = args.iter().position(|a| a == "-o") else {
        return Ok(None);
    };
    if index + 1 >= args.len() {
        bail!("-o needs a path");
    }
    let out = args.remove(index + 1);
    args.remove(index);
    Ok(Some(PathBuf::from(out)))
}

fn print_value(value: Option<String>) {
    if let Some(value) = value {
        println!("{value}");
    }
}

fn print_info(scene: &SceneFile) {
    println!("file:     {}", scene.path().display());
    println!("encoding: {:?}", scene.encoding());
    if let Some(version) = scene.maya_version() {
        println!("version:  {version}");
    }
    for (label, unit) in [("linear", UnitKind::Linear), ("angle", UnitKind::Angle), ("time", UnitKind::Time)] {
        if let Some(value) = scene.unit(unit) {
            println!("{label:<9} {value}");
        }
    }
    for (title, kind) in [("plugins", MetaKind::Plugin), ("fileinfo", MetaKind::FileInfo)] {
        let entries = scene.list(kind);
        if entries.is_empty() {
            continue;
        }
        println!("{title}:");
        for (key, value) in entries {
            println!("  {key} = {value}");
        }
    }
}

fn dump(scene: &SceneFile) -> anyhow::Result<()> {
    let SceneFile::Binary(binary) = scene else {
        bail!("dump is only available for binary scenes");
    };
    for record in binary.records() {
        println!(
            "{} {:>6}  {}  {}",
            record.kind.tag(),
            record.stored_length(),
            record.key_str(),
            record.value_str()
        );
    }
    let header = binary.layout().header;
    for row in hex_rows(&binary.raw_header()?, header.data_offset) {
        println!("{row}");
    }
    Ok(())
}
