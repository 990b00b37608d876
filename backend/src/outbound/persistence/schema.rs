//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Library members. `code` is the public identifier.
    members (id) {
        id -> Int8,
        code -> Varchar,
        is_penalized -> Bool,
        /// Null with `is_penalized` set means a permanent penalty.
        penalty_until -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Catalogue entries. `stock` counts copies on the shelf (`CHECK >= 0`).
    books (id) {
        id -> Int8,
        code -> Varchar,
        title -> Varchar,
        stock -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Loans. Active while `returned_at` is null; at most one active loan per
    /// member and book (partial unique index).
    loans (id) {
        id -> Uuid,
        member_id -> Int8,
        book_id -> Int8,
        borrowed_at -> Timestamptz,
        returned_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(loans -> members (member_id));
diesel::joinable!(loans -> books (book_id));

diesel::allow_tables_to_appear_in_same_query!(books, loans, members);
