/// Database row types for the review slot store

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct DbClassroom {
    pub classroom_id: i64,
    pub name: String,
    pub faculty_id: String,
    pub link_code: String,
}

#[derive(Debug, Clone)]
pub struct DbSlot {
    pub slot_id: i64,
    pub classroom_id: i64,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i64,
    pub review_stage: String,
    pub is_available: bool,
    pub booking_deadline: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DbBooking {
    pub booking_id: i64,
    pub slot_id: i64,
    pub team_id: i64,
}
