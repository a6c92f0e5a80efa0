//! Diesel schema for media server persistence.

diesel::table! {
    /// Registered media servers.
    media_servers (id) {
        /// Server identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Protocol variant (jellyfin, subsonic or navidrome).
        #[max_length = 20]
        server_type -> Varchar,
        /// Primary address.
        url -> Text,
        /// Legacy Subsonic authentication flag.
        legacy -> Bool,
        /// User identifier assigned by the remote server.
        remote_user_id -> Nullable<Text>,
        /// Remote username.
        username -> Text,
        /// Primary session token.
        token -> Text,
        /// Subsonic authentication query fragment.
        subsonic_auth -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Alternate URLs of media servers.
    server_urls (id) {
        /// URL identifier.
        id -> Uuid,
        /// Owning server.
        server_id -> Uuid,
        /// Alternate address.
        url -> Text,
        /// Whether remote calls use this address.
        enabled -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(server_urls -> media_servers (server_id));
diesel::allow_tables_to_appear_in_same_query!(media_servers, server_urls);
