pub mod event;

pub use event::{
    CreateEventRequest, CreateRowRequest, CreateSectionRequest, Event, Row, RowAvailability,
    Section, SectionAvailability,
};
