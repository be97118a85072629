// Hand-maintained Diesel schema; keep in sync with the SQL migrations.

diesel::table! {
    availability (id) {
        id -> Text,
        timezone -> Text,
        slot_duration_minutes -> Int8,
        days_ahead -> Int8,
        start_days_from_now -> Int8,
        days -> Jsonb,
        revision -> Int8,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    invite_token (token) {
        token -> Text,
        email -> Text,
        guest_name -> Nullable<Text>,
        expires_at -> Timestamptz,
        used -> Bool,
        used_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    booking (id) {
        id -> Uuid,
        token -> Text,
        guest_name -> Text,
        email -> Text,
        slot_start -> Timestamptz,
        notes -> Text,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(availability, invite_token, booking);
