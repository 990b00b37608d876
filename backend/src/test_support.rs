//! Test utilities for the backend crate.
//!
//! Shared by unit tests in `src/` and integration tests in `tests/`. Compiled
//! for `cfg(test)` and when the `test-support` feature is enabled.

pub mod clock {
    //! A settable clock for exercising time-dependent lending rules.

    use std::sync::{Mutex, MutexGuard, PoisonError};

    use chrono::{DateTime, Duration, Local, TimeZone, Utc};
    use mockable::Clock;

    /// Clock that only moves when told to.
    #[derive(Debug)]
    pub struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        /// Clock reading `now` until moved.
        #[must_use]
        pub const fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        /// A clock pinned to 2025-01-06T09:00:00Z.
        ///
        /// # Panics
        /// Never in practice; the fixed timestamp is unambiguous in UTC.
        #[must_use]
        pub fn at_library_opening() -> Self {
            Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).single().map_or_else(
                || panic!("fixed opening timestamp is unambiguous"),
                Self::new,
            )
        }

        /// Move the clock forward by `delta`.
        pub fn advance(&self, delta: Duration) {
            *self.lock_clock() += delta;
        }

        /// Move the clock forward by whole days.
        pub fn advance_days(&self, days: i64) {
            self.advance(Duration::days(days));
        }

        /// Jump to `now`, forwards or backwards.
        pub fn set(&self, now: DateTime<Utc>) {
            *self.lock_clock() = now;
        }

        fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
            self.0.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.lock_clock()
        }
    }
}

pub mod cap_fs {
    //! Capability-safe file writes for tests that need files on disk.

    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Write `contents` to `path`, creating or truncating the file.
    pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "path must include a file name",
            )
        })?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.write(Path::new(file_name), contents)
    }
}

pub mod library {
    //! The demo catalogue shared by handler and behaviour tests.

    use std::sync::Arc;

    use crate::domain::{Book, BookCode, LendingPolicy, LendingService, Member, MemberCode};
    use crate::inbound::http::state::HttpState;
    use crate::outbound::memory::InMemoryLendingStore;

    use super::MutableClock;

    /// `(code, title, stock)` for each demo book.
    pub const DEMO_BOOKS: [(&str, &str, u32); 3] = [
        ("JK-45", "Harry Potter", 1),
        ("SHR-1", "A Study in Scarlet", 2),
        ("TOL-3", "The Hobbit", 3),
    ];

    /// Codes of the demo members, none of them penalized.
    pub const DEMO_MEMBERS: [&str; 2] = ["M001", "M002"];

    /// In-memory store holding the demo books and members.
    ///
    /// # Panics
    /// Only if the demo constants stop validating.
    #[must_use]
    pub fn demo_store() -> InMemoryLendingStore {
        let books = DEMO_BOOKS.iter().map(|(raw_code, title, stock)| {
            let book = BookCode::new(raw_code)
                .map_err(|err| err.to_string())
                .and_then(|code| Book::new(code, *title, *stock).map_err(|err| err.to_string()));
            book.unwrap_or_else(|err| panic!("demo book {raw_code}: {err}"))
        });
        let members = DEMO_MEMBERS.iter().map(|raw_code| {
            MemberCode::new(raw_code)
                .map(Member::clear)
                .unwrap_or_else(|err| panic!("demo member {raw_code}: {err}"))
        });
        InMemoryLendingStore::with_records(books, members)
    }

    /// HTTP state serving the demo library on `clock`.
    #[must_use]
    pub fn demo_http_state(clock: Arc<MutableClock>) -> HttpState {
        let service = Arc::new(LendingService::new(
            Arc::new(demo_store()),
            LendingPolicy::default(),
            clock,
        ));
        HttpState::new(service.clone(), service)
    }
}

pub use clock::MutableClock;
