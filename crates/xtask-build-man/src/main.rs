//! Build the man pages for `dbus-commit-string`

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use clap::{CommandFactory, Parser};
use clap_mangen::Man;

mod opts {
    #![expect(warnings, clippy::all)]

    include!("../../../src/opts.rs");
}

#[derive(Parser)]
struct Opts {
    /// Output gzip-compressed man pages
    #[arg(short = 'z', long)]
    gzip: bool,
}

const BIN_NAME: &str = "dbus-commit-string";
const SECTION: &str = "1";

fn render_page(cmd: clap::Command, mut out: impl Write) -> io::Result<()> {
    let has_arguments = cmd.get_arguments().any(|a| !a.is_hide_set());
    let has_subcommands = cmd.get_subcommands().any(|a| !a.is_hide_set());
    let has_version = cmd.get_version().is_some() || cmd.get_long_version().is_some();
    let has_author = cmd.get_author().is_some();
    let man = Man::new(cmd).section(SECTION);

    man.render_title(&mut out)?;
    man.render_name_section(&mut out)?;
    man.render_synopsis_section(&mut out)?;
    man.render_description_section(&mut out)?;

    if has_arguments {
        man.render_options_section(&mut out)?;
    }

    if has_subcommands {
        man.render_subcommands_section(&mut out)?;
    }

    if has_version {
        man.render_version_section(&mut out)?;
    }

    if has_author {
        man.render_authors_section(&mut out)?;
    }

    Ok(())
}

fn render(opts: &Opts, dir: &Path, cmd: clap::Command, name: &[&str]) -> io::Result<PathBuf> {
    let file = format!(
        "{}.{SECTION}{}",
        name.join("-"),
        if opts.gzip { ".gz" } else { "" }
    );
    let path = dir.join(file);
    let cmd = cmd.name(name.join(" ")).display_name(name.join("-"));

    let mut page = Vec::new();
    render_page(cmd, &mut page)?;

    let out = fs::File::create_new(&path)?;

    if opts.gzip {
        let mut gz = flate2::write::GzEncoder::new(out, flate2::Compression::best());
        gz.write_all(&page)?;
        gz.finish()?;
    } else {
        let mut out = out;
        out.write_all(&page)?;
    }

    Ok(path)
}

fn main() -> io::Result<()> {
    let opts = Opts::parse();

    // Back out of crates/xtask-build-man into the workspace root
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
    let dir = root.join("man").join(format!("man{SECTION}"));

    if dir.exists() {
        fs::remove_dir_all(&dir)?;
    }
    fs::create_dir_all(&dir)?;

    let cmd = opts::Opts::command().disable_help_subcommand(true);
    let ver = cmd.get_version().unwrap_or_default().to_owned();
    let author = cmd.get_author().unwrap_or_default().to_owned();

    let mut pages = vec![];

    for sub in cmd.get_subcommands().filter(|c| !c.is_hide_set()) {
        let sub_cmd = sub.clone().version(&ver).author(&author);
        pages.push(render(&opts, &dir, sub_cmd, &[BIN_NAME, sub.get_name()])?);
    }

    pages.push(render(&opts, &dir, cmd, &[BIN_NAME])?);

    for page in pages {
        println!("Rendered {}", page.display());
    }

    Ok(())
}
