//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Enumerations are
//! stored as `TEXT` guarded by `CHECK` constraints and converted at the
//! adapter boundary.

diesel::table! {
    /// Credential records. One per account.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Public profile sharing the account id.
    profiles (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Role grants; the primary key makes grants idempotent.
    user_roles (user_id, role) {
        user_id -> Uuid,
        role -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    tickets (id) {
        id -> Uuid,
        student_id -> Uuid,
        subject -> Varchar,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    ticket_messages (id) {
        id -> Uuid,
        ticket_id -> Uuid,
        sender_id -> Uuid,
        message_type -> Text,
        content -> Text,
        transcript -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Attachment metadata; bytes live in the object store.
    media_assets (id) {
        id -> Uuid,
        message_id -> Uuid,
        storage_path -> Text,
        file_type -> Text,
        content_type -> Text,
        byte_size -> Int8,
        sha256 -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only security audit trail.
    security_audit_logs (id) {
        id -> Uuid,
        user_id -> Nullable<Uuid>,
        action -> Text,
        details -> Jsonb,
        ip_address -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(profiles -> users (id));
diesel::joinable!(user_roles -> users (user_id));
diesel::joinable!(tickets -> profiles (student_id));
diesel::joinable!(ticket_messages -> tickets (ticket_id));
diesel::joinable!(media_assets -> ticket_messages (message_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    profiles,
    user_roles,
    tickets,
    ticket_messages,
    media_assets,
    security_audit_logs,
);

diesel::define_sql_function! {
    /// `has_role(user_id, role)` from the schema migration.
    fn has_role(user_id: diesel::sql_types::Uuid, role: diesel::sql_types::Text) -> diesel::sql_types::Bool;
}

diesel::define_sql_function! {
    /// `can_invite_staff(user_id)` from the schema migration.
    fn can_invite_staff(user_id: diesel::sql_types::Uuid) -> diesel::sql_types::Bool;
}
