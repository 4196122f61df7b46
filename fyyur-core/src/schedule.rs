//! Past/upcoming classification of shows.
//!
//! Nothing about a show's timing is stored: whether it is past or upcoming is
//! decided at read time against the `now` the caller passes in. A show whose
//! start time is strictly before `now` is past; everything else, including a
//! show starting exactly at `now`, is upcoming.

use chrono::NaiveDateTime;
use serde::Serialize;

/// Anything carrying a start time can be partitioned.
pub trait Scheduled {
    fn start_time(&self) -> NaiveDateTime;
}

impl Scheduled for crate::domain::Show {
    fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }
}

impl Scheduled for crate::domain::VenueShow {
    fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }
}

impl Scheduled for crate::domain::ArtistShow {
    fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partitioned<T> {
    pub past: Vec<T>,
    pub upcoming: Vec<T>,
}

impl<T> Partitioned<T> {
    pub fn past_count(&self) -> usize {
        self.past.len()
    }

    pub fn upcoming_count(&self) -> usize {
        self.upcoming.len()
    }
}

impl<T> Default for Partitioned<T> {
    fn default() -> Self {
        Self {
            past: Vec::new(),
            upcoming: Vec::new(),
        }
    }
}

pub fn is_past(start_time: NaiveDateTime, now: NaiveDateTime) -> bool {
    start_time < now
}

/// Split `shows` into past and upcoming, keeping their relative order.
pub fn partition<T, I>(shows: I, now: NaiveDateTime) -> Partitioned<T>
where
    T: Scheduled,
    I: IntoIterator<Item = T>,
{
    let (past, upcoming) = shows
        .into_iter()
        .partition(|show| is_past(show.start_time(), now));
    Partitioned { past, upcoming }
}
