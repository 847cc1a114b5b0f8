use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use icssc::diag::Diag;
use icssc::{CompileError, CompileOptions};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing_subscriber::EnvFilter;

const USAGE: &str = r#"usage: icss <command> [options] [file]

commands:
  build     Compile the package entries into the output directory
  check     Parse, type check and fold without writing output
  clean     Remove the build cache

options:
  --manifest-path <path>  Path to icss.toml (defaults to nearest parent)
  --file <path>           Entry file override
  --select-branches       Keep only the branch each if/else selects
  --clean                 Remove .icss/build and the output directory before building (build only)
"#;

const MANIFEST_FILE: &str = "icss.toml";
const BUILD_META_VERSION: u32 = 1;
const BUILD_CLI_VERSION_FINGERPRINT: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    package: PackageConfig,
    #[serde(default)]
    build: BuildConfig,
}

#[derive(Debug, Default, Deserialize)]
struct PackageConfig {
    name: Option<String>,
    #[serde(alias = "main")]
    entry: Option<String>,
    #[serde(default)]
    entries: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BuildConfig {
    #[serde(default = "default_out_dir")]
    out_dir: String,
    #[serde(default)]
    select_branches: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            select_branches: false,
        }
    }
}

fn default_out_dir() -> String {
    "dist".to_string()
}

#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
struct BuildMeta {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    files: Vec<BuildFileMeta>,
    #[serde(default)]
    manifest_hash: Option<String>,
    #[serde(default)]
    select_branches: bool,
    #[serde(default)]
    cli_version: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct BuildFileMeta {
    path: String,
    #[serde(default)]
    hash: String,
}

#[derive(Default)]
struct CommonArgs {
    manifest_path: Option<PathBuf>,
    entry: Option<String>,
    select_branches: bool,
    clean: bool,
}

#[derive(Copy, Clone)]
enum Command {
    Build,
    Check,
    Clean,
}

impl Command {
    fn tag(self) -> &'static str {
        match self {
            Command::Build => "build",
            Command::Check => "check",
            Command::Clean => "clean",
        }
    }
}

fn emit_cli_error(message: &str) {
    eprintln!("error: {message}");
}

fn emit_command_step(command: Command, message: &str) {
    eprintln!("[{}] {message}", command.tag());
}

fn finalize_command(command: Command, code: i32) -> i32 {
    match code {
        0 => emit_command_step(command, "ok"),
        _ => emit_command_step(command, "failed"),
    }
    code
}

fn main() {
    init_tracing();
    let args: Vec<String> = env::args().skip(1).collect();
    let code = run(args);
    std::process::exit(code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ICSS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Vec<String>) -> i32 {
    let Some((cmd, rest)) = args.split_first() else {
        eprintln!("{USAGE}");
        return 1;
    };
    let command = match cmd.as_str() {
        "build" => Command::Build,
        "check" => Command::Check,
        "clean" => Command::Clean,
        _ => {
            emit_cli_error(&format!("unknown command: {cmd}"));
            eprintln!("{USAGE}");
            return 1;
        }
    };
    let allow_clean = matches!(command, Command::Build);
    let common = match parse_common_args(rest, allow_clean) {
        Ok(args) => args,
        Err(err) => {
            emit_cli_error(&err);
            eprintln!("{USAGE}");
            return 1;
        }
    };

    let (manifest, manifest_dir) = match load_manifest(common.manifest_path.as_deref()) {
        Ok(value) => value,
        Err(err) => {
            emit_cli_error(&err);
            return 1;
        }
    };
    if let Some(name) = manifest.as_ref().and_then(|m| m.package.name.as_deref()) {
        tracing::debug!(package = name, "loaded manifest");
    }

    if matches!(command, Command::Clean) {
        let code = match clean_build_dir(manifest_dir.as_deref()) {
            Ok(()) => 0,
            Err(err) => {
                emit_cli_error(&err);
                1
            }
        };
        return finalize_command(command, code);
    }

    let entries = match resolve_entries(&common, manifest.as_ref(), manifest_dir.as_deref()) {
        Ok(entries) => entries,
        Err(err) => {
            emit_cli_error(&err);
            return 1;
        }
    };

    let code = match command {
        Command::Check => run_check(&entries),
        Command::Build => {
            let build = manifest.as_ref().map(|m| &m.build);
            let options = CompileOptions {
                select_branches: common.select_branches
                    || build.map(|b| b.select_branches).unwrap_or(false),
            };
            let out_dir = build
                .map(|b| b.out_dir.clone())
                .unwrap_or_else(default_out_dir);
            run_build(&entries, manifest_dir.as_deref(), &out_dir, options, common.clean)
        }
        Command::Clean => 0,
    };
    finalize_command(command, code)
}

fn parse_common_args(args: &[String], allow_clean: bool) -> Result<CommonArgs, String> {
    let mut out = CommonArgs::default();
    let mut idx = 0;
    while idx < args.len() {
        let arg = &args[idx];
        if arg == "--manifest-path" {
            idx += 1;
            let Some(path) = args.get(idx) else {
                return Err("--manifest-path expects a path".to_string());
            };
            out.manifest_path = Some(PathBuf::from(path));
            idx += 1;
            continue;
        }
        if arg == "--file" {
            idx += 1;
            let Some(path) = args.get(idx) else {
                return Err("--file expects a path".to_string());
            };
            out.entry = Some(path.clone());
            idx += 1;
            continue;
        }
        if arg == "--select-branches" {
            out.select_branches = true;
            idx += 1;
            continue;
        }
        if arg == "--clean" {
            if !allow_clean {
                return Err("--clean is only supported for icss build".to_string());
            }
            out.clean = true;
            idx += 1;
            continue;
        }
        if arg.starts_with("--") {
            return Err(format!("unknown option: {arg}"));
        }
        if out.entry.is_none() {
            if out.manifest_path.is_none() {
                let candidate = PathBuf::from(arg);
                if candidate.is_dir() && candidate.join(MANIFEST_FILE).exists() {
                    out.manifest_path = Some(candidate);
                    idx += 1;
                    continue;
                }
            }
            out.entry = Some(arg.clone());
            idx += 1;
            continue;
        }
        return Err(format!("unexpected argument: {arg}"));
    }
    Ok(out)
}

fn load_manifest(
    manifest_override: Option<&Path>,
) -> Result<(Option<Manifest>, Option<PathBuf>), String> {
    let (manifest_path, manifest_dir) = if let Some(path) = manifest_override {
        if path.is_dir() {
            let file = path.join(MANIFEST_FILE);
            (Some(file), Some(path.to_path_buf()))
        } else {
            (
                Some(path.to_path_buf()),
                path.parent().map(|p| p.to_path_buf()),
            )
        }
    } else {
        let cwd = env::current_dir().map_err(|err| format!("cwd error: {err}"))?;
        let path = find_manifest(&cwd);
        let dir = path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()));
        (path, dir)
    };

    let Some(path) = manifest_path else {
        return Ok((None, None));
    };
    let content = fs::read_to_string(&path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    let manifest: Manifest =
        toml::from_str(&content).map_err(|err| format!("invalid manifest: {err}"))?;
    Ok((Some(manifest), manifest_dir))
}

fn find_manifest(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        let candidate = dir.join(MANIFEST_FILE);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// `--file` (or a positional path) replaces the manifest's entries.
fn resolve_entries(
    common: &CommonArgs,
    manifest: Option<&Manifest>,
    manifest_dir: Option<&Path>,
) -> Result<Vec<PathBuf>, String> {
    let names: Vec<String> = match &common.entry {
        Some(entry) => vec![entry.clone()],
        None => manifest
            .map(|m| {
                m.package
                    .entry
                    .iter()
                    .chain(m.package.entries.iter())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default(),
    };
    if names.is_empty() {
        return Err(
            "missing entry: pass a file path or set package.entry in icss.toml".to_string(),
        );
    }
    let base = project_dir(manifest_dir)?;
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let path = PathBuf::from(&name);
        let path = if path.is_absolute() { path } else { base.join(path) };
        if !out.contains(&path) {
            out.push(path);
        }
    }
    Ok(out)
}

fn run_check(entries: &[PathBuf]) -> i32 {
    let mut code = 0;
    for entry in entries {
        let src = match fs::read_to_string(entry) {
            Ok(src) => src,
            Err(err) => {
                emit_cli_error(&format!("failed to read {}: {err}", entry.display()));
                code = 1;
                continue;
            }
        };
        match icssc::compile(&src, &CompileOptions::default()) {
            Ok(_) => {}
            Err(CompileError::Diagnostics(diags)) => {
                emit_diags(&diags, entry, &src);
                code = 1;
            }
            Err(err) => {
                emit_cli_error(&err.to_string());
                code = 1;
            }
        }
    }
    code
}

fn run_build(
    entries: &[PathBuf],
    manifest_dir: Option<&Path>,
    out_dir: &str,
    options: CompileOptions,
    clean: bool,
) -> i32 {
    let base = match project_dir(manifest_dir) {
        Ok(base) => base,
        Err(err) => {
            emit_cli_error(&err);
            return 1;
        }
    };
    let out_dir = base.join(out_dir);
    if clean {
        if let Err(err) = clean_build_dir(manifest_dir).and_then(|()| remove_dir(&out_dir)) {
            emit_cli_error(&err);
            return 1;
        }
    }
    let mut code = 0;
    for entry in entries {
        if let Err(err) = build_entry(entry, manifest_dir, &out_dir, options) {
            emit_cli_error(&err);
            code = 1;
        }
    }
    code
}

fn build_entry(
    entry: &Path,
    manifest_dir: Option<&Path>,
    out_dir: &Path,
    options: CompileOptions,
) -> Result<(), String> {
    let stem = entry
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .ok_or_else(|| format!("invalid entry path: {}", entry.display()))?;
    let out_path = out_dir.join(format!("{stem}.css"));
    let meta_path = build_dir(manifest_dir)?.join(format!("{stem}.meta"));
    let meta = build_meta(entry, manifest_dir, options)?;

    if out_path.exists() && load_build_meta(&meta_path).as_ref() == Some(&meta) {
        emit_command_step(Command::Build, &format!("{} up to date", entry.display()));
        return Ok(());
    }
    if meta_path.exists() {
        tracing::warn!(meta = %meta_path.display(), "stale build cache entry");
    }

    let src = fs::read_to_string(entry)
        .map_err(|err| format!("failed to read {}: {err}", entry.display()))?;
    let css = match icssc::compile(&src, &options) {
        Ok(css) => css,
        Err(CompileError::Diagnostics(diags)) => {
            emit_diags(&diags, entry, &src);
            return Err(format!("failed to compile {}", entry.display()));
        }
        Err(err) => return Err(err.to_string()),
    };

    fs::create_dir_all(out_dir)
        .map_err(|err| format!("failed to create {}: {err}", out_dir.display()))?;
    fs::write(&out_path, &css)
        .map_err(|err| format!("failed to write {}: {err}", out_path.display()))?;
    write_build_meta(&meta_path, &meta)?;
    tracing::info!(path = %out_path.display(), bytes = css.len(), "wrote stylesheet");
    emit_command_step(
        Command::Build,
        &format!("{} -> {}", entry.display(), out_path.display()),
    );
    Ok(())
}

fn project_dir(manifest_dir: Option<&Path>) -> Result<PathBuf, String> {
    match manifest_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => env::current_dir().map_err(|err| format!("cwd error: {err}")),
    }
}

fn build_dir(manifest_dir: Option<&Path>) -> Result<PathBuf, String> {
    Ok(project_dir(manifest_dir)?.join(".icss").join("build"))
}

fn clean_build_dir(manifest_dir: Option<&Path>) -> Result<(), String> {
    remove_dir(&build_dir(manifest_dir)?)
}

fn remove_dir(dir: &Path) -> Result<(), String> {
    if dir.exists() {
        fs::remove_dir_all(dir)
            .map_err(|err| format!("failed to remove {}: {err}", dir.display()))?;
    }
    Ok(())
}

fn build_meta(
    entry: &Path,
    manifest_dir: Option<&Path>,
    options: CompileOptions,
) -> Result<BuildMeta, String> {
    let files = vec![BuildFileMeta {
        path: entry.to_string_lossy().to_string(),
        hash: file_hash_hex(entry)?,
    }];
    let manifest_hash = manifest_dir
        .map(|dir| dir.join(MANIFEST_FILE))
        .and_then(|path| optional_file_hash_hex(&path).transpose())
        .transpose()?;
    Ok(BuildMeta {
        version: BUILD_META_VERSION,
        files,
        manifest_hash,
        select_branches: options.select_branches,
        cli_version: BUILD_CLI_VERSION_FINGERPRINT.to_string(),
    })
}

fn load_build_meta(path: &Path) -> Option<BuildMeta> {
    let bytes = fs::read(path).ok()?;
    bincode::deserialize(&bytes).ok()
}

fn write_build_meta(path: &Path, meta: &BuildMeta) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create {}: {err}", parent.display()))?;
    }
    let bytes =
        bincode::serialize(meta).map_err(|err| format!("failed to encode build meta: {err}"))?;
    fs::write(path, bytes).map_err(|err| format!("failed to write {}: {err}", path.display()))
}

fn file_hash_hex(path: &Path) -> Result<String, String> {
    let bytes =
        fs::read(path).map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    Ok(hash_hex(&Sha256::digest(&bytes)))
}

fn optional_file_hash_hex(path: &Path) -> Result<Option<String>, String> {
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(file_hash_hex(path)?))
}

fn hash_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

fn emit_diags(diags: &[Diag], path: &Path, src: &str) {
    for diag in diags {
        eprintln!("{}", diag.render(Some(path), src));
    }
}
