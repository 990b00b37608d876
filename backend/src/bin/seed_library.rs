//! Load books and members from a JSON seed file into the library database.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;

use library_backend::domain::ports::LendingStore;
use library_backend::domain::{LibrarySeed, LibrarySeeder, SeedSummary};
use library_backend::outbound::memory::InMemoryLendingStore;
use library_backend::outbound::persistence::{
    DbPool, DieselLendingStore, PoolConfig, run_pending_migrations,
};
use library_backend::settings::LibrarySettings;

/// `seed-library` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "seed-library",
    about = "Insert missing books and members from a JSON seed file",
    version
)]
struct CliArgs {
    /// Path to the seed document.
    #[arg(long = "seed", value_name = "path")]
    seed_path: PathBuf,
    /// Database connection URL. Falls back to the service settings.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Validate and apply the seed to an empty in-memory store only.
    #[arg(long = "dry-run")]
    dry_run: bool,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let seed = read_seed(&args.seed_path)?;

    let summary = if args.dry_run {
        apply(InMemoryLendingStore::new(), seed).await?
    } else {
        let database_url = resolve_database_url(args.database_url)?;
        let migrate_url = database_url.clone();
        tokio::task::spawn_blocking(move || run_pending_migrations(&migrate_url))
            .await
            .map_err(|error| io::Error::other(format!("migration task failed: {error}")))?
            .map_err(|error| io::Error::other(format!("migrate database: {error}")))?;
        let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(1))
            .await
            .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
        apply(DieselLendingStore::new(pool), seed).await?
    };

    report(&mut io::stdout().lock(), args.dry_run, &summary)
}

fn report(out: &mut impl Write, dry_run: bool, summary: &SeedSummary) -> io::Result<()> {
    writeln!(out, "dry_run={dry_run}")?;
    writeln!(out, "books_inserted={}", summary.books_inserted)?;
    writeln!(out, "books_skipped={}", summary.books_skipped)?;
    writeln!(out, "members_inserted={}", summary.members_inserted)?;
    writeln!(out, "members_skipped={}", summary.members_skipped)
}

async fn apply<S>(store: S, seed: LibrarySeed) -> io::Result<SeedSummary>
where
    S: LendingStore + 'static,
{
    LibrarySeeder::new(Arc::new(store))
        .apply(seed)
        .await
        .map_err(|error| io::Error::other(format!("apply seed: {error}")))
}

fn read_seed(path: &Path) -> io::Result<LibrarySeed> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "seed path must be a file"))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
        io::Error::other(format!(
            "open seed directory '{}': {error}",
            parent.display()
        ))
    })?;
    let mut contents = String::new();
    directory
        .open(Path::new(file_name))
        .and_then(|mut file| file.read_to_string(&mut contents))
        .map_err(|error| io::Error::other(format!("read seed '{}': {error}", path.display())))?;
    serde_json::from_str(&contents).map_err(|error| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("parse seed '{}': {error}", path.display()),
        )
    })
}

fn resolve_database_url(explicit: Option<String>) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    let settings = LibrarySettings::load_from_iter([OsString::from("seed-library")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    settings.database_url().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "database URL missing: set --database-url, LIBRARY_DATABASE_URL or DATABASE_URL",
        )
    })
}

#[cfg(test)]
mod tests {
    //! Unit tests for seed loading helpers.

    use std::path::PathBuf;

    use library_backend::test_support::cap_fs::write_file;
    use rstest::rstest;

    use super::{apply, read_seed, report, resolve_database_url};
    use library_backend::outbound::memory::InMemoryLendingStore;

    fn scratch_file(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("seed-{}.json", uuid::Uuid::new_v4()));
        write_file(&path, contents.as_bytes()).expect("write seed file");
        path
    }

    #[rstest]
    fn reads_a_well_formed_seed() {
        let path = scratch_file(
            r#"{"books":[{"code":"JK-45","title":"Harry Potter","stock":1}],"members":[{"code":"M001"}]}"#,
        );
        let seed = read_seed(&path).expect("seed should parse");
        assert_eq!(seed.books.len(), 1);
        assert_eq!(seed.members[0].code, "M001");
    }

    #[rstest]
    fn rejects_unknown_fields() {
        let path = scratch_file(r#"{"books":[],"patrons":[]}"#);
        let error = read_seed(&path).expect_err("unknown field");
        assert_eq!(error.kind(), std::io::ErrorKind::InvalidData);
    }

    #[rstest]
    fn blank_database_url_is_rejected() {
        let error = resolve_database_url(Some("  ".to_owned())).expect_err("blank url");
        assert!(error.to_string().contains("must not be empty"));
    }

    #[rstest]
    #[tokio::test]
    async fn dry_runs_report_what_would_be_inserted() {
        let path = scratch_file(
            r#"{"books":[{"code":"JK-45","title":"Harry Potter","stock":1},{"code":"JK-45","title":"Harry Potter","stock":1}],"members":[{"code":"M001"}]}"#,
        );
        let seed = read_seed(&path).expect("seed should parse");
        let summary = apply(InMemoryLendingStore::new(), seed)
            .await
            .expect("seed applies");
        assert_eq!(summary.books_inserted, 1);
        assert_eq!(summary.books_skipped, 1);
        assert_eq!(summary.members_inserted, 1);

        let mut out = Vec::new();
        report(&mut out, true, &summary).expect("report");
        assert_eq!(
            String::from_utf8(out).expect("utf-8 report"),
            "dry_run=true\nbooks_inserted=1\nbooks_skipped=1\nmembers_inserted=1\nmembers_skipped=0\n"
        );
    }
}
