//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. When a
//! migration changes a table, update the matching block here (or regenerate
//! with `diesel print-schema`).

diesel::table! {
    /// Shared pool of custom domains members may claim.
    custom_domains (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Lowercase fully qualified name, unique across the catalogue.
        name -> Varchar,
        /// Only premium members may claim the domain.
        only_premium -> Bool,
        /// Maximum concurrent holders; zero means unlimited.
        max_usage -> Int4,
        /// Number of rows in `domain_assignments` for this domain.
        current_usage -> Int4,
        /// Instant from which the domain no longer accepts claims.
        expires_at -> Timestamptz,
        created_at -> Timestamptz,
        /// Last modification timestamp (auto-updated by trigger).
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ledger of member claims; one row per (user, domain).
    domain_assignments (id) {
        id -> Uuid,
        user_id -> Uuid,
        domain_id -> Uuid,
        assigned_at -> Timestamptz,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Entitlement projection maintained by the membership system.
    members (user_id) {
        user_id -> Uuid,
        has_premium -> Bool,
        is_admin -> Bool,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(domain_assignments -> custom_domains (domain_id));

diesel::allow_tables_to_appear_in_same_query!(custom_domains, domain_assignments, members);
