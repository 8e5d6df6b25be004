//! ngshift command-line entry point

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ngshift_foundation::RefactorResult;
use ngshift_services::fs::OsFs;
use ngshift_services::{run_refactor, RefactorOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ngshift")]
#[command(about = "Rename Angular-style files to the suffix-free convention and rewrite their references")]
#[command(version)]
struct Cli {
    /// Project directory to refactor
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Report every rename and rewrite without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Only process files matching this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    include: Vec<String>,

    /// Skip files matching this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// The project's own package scope (e.g. '@app'); imports under it are
    /// treated as project-local
    #[arg(long, value_name = "SCOPE")]
    scope: Option<String>,

    /// Emit the full result as JSON instead of the plain-text summary
    #[arg(long)]
    json: bool,

    /// Verbose logging (debug level)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = cli.path.clone();
    let options = RefactorOptions {
        include: cli.include.clone(),
        exclude: cli.exclude.clone(),
        dry_run: cli.dry_run,
        project_scope: cli.scope.clone(),
    };

    tracing::info!(root = %root.display(), dry_run = cli.dry_run, "Starting refactor");
    let result = run_refactor(&OsFs, &root, options);

    // A failure to scan the root at all is the only fatal outcome
    let scan_failed = result.processed_files.is_empty()
        && result.errors.iter().any(|e| e.file_path == root);

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: could not serialize result: {}", e);
                return ExitCode::from(1);
            }
        }
    } else {
        print_summary(&result, cli.dry_run);
    }

    if scan_failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn print_summary(result: &RefactorResult, dry_run: bool) {
    let mode = if dry_run { " (dry run)" } else { "" };

    if !result.renamed_files.is_empty() {
        println!("Renamed files{}:", mode);
        for op in &result.renamed_files {
            println!(
                "  {} -> {}  [{}]",
                op.old_path.display(),
                op.new_path.display(),
                op.reason
            );
        }
        println!();
    }

    if !result.content_changes.is_empty() {
        println!("Updated references{}:", mode);
        for change in &result.content_changes {
            println!("  {}:{}", change.file_path.display(), change.line);
            println!("    - {}", change.old_content.trim_end());
            println!("    + {}", change.new_content.trim_end());
        }
        println!();
    }

    if !result.manual_review_required.is_empty() {
        println!("Manual review required:");
        for item in &result.manual_review_required {
            println!(
                "  {} (wanted {}): {}",
                item.file_path.display(),
                item.desired_new_path.display(),
                item.reason
            );
        }
        println!();
    }

    if !result.errors.is_empty() {
        println!("Errors:");
        for error in &result.errors {
            println!("  {}: {}", error.file_path.display(), error.message);
        }
        println!();
    }

    println!(
        "{} file(s) processed, {} renamed, {} reference(s) updated, {} for manual review, {} error(s){}",
        result.processed_files.len(),
        result.renamed_files.len(),
        result.content_changes.len(),
        result.manual_review_required.len(),
        result.errors.len(),
        mode
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngshift_services::fs::Vfs;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn refactors_a_real_directory_tree() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("src");
        fs::create_dir_all(&src).expect("create src");
        fs::write(src.join("auth.guard.ts"), "export const authGuard = () => true;\n")
            .expect("write guard");
        fs::write(
            src.join("app.ts"),
            "import { authGuard } from './auth.guard';\n",
        )
        .expect("write app");

        let result = run_refactor(&OsFs, &src, RefactorOptions::default());

        assert_eq!(result.renamed_files.len(), 1);
        assert!(OsFs.exists(&src.join("auth-guard.ts")));
        assert_eq!(
            fs::read_to_string(src.join("app.ts")).expect("read app"),
            "import { authGuard } from './auth-guard';\n"
        );
    }

    #[test]
    fn missing_root_is_reported_not_thrown() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope");
        let result = run_refactor(&OsFs, &missing, RefactorOptions::default());
        assert!(result.processed_files.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].file_path, missing);
    }
}
