use crate::use_cases::RealmHandle;

pub struct AppState {
    // Channels into and out of the realm's world task.
    pub realm: RealmHandle,
    // Reported to clients in Init so they can interpolate.
    pub tick_rate: u32,
}
