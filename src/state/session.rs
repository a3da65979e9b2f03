//! Club-night session context: club, date, guest numbering and the notified cache.

use std::collections::{BTreeSet, HashMap};

use time::{
    Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::state::pool::{Gender, PlayerId};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const GUEST_PREFIX: &str = "guest_";

/// Current session date (UTC).
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// `YYYY-MM-DD` rendering used in snapshot keys and collaborator payloads.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| {
        format!("{}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
    })
}

/// Milliseconds since the Unix epoch, used for clock baselines.
pub fn now_ms() -> u64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    u64::try_from(nanos / 1_000_000).unwrap_or_default()
}

/// Parse the sequence number out of a `guest_{gender}_{seq}` id.
pub fn parse_guest_id(player_id: &str) -> Option<(Gender, u64)> {
    let rest = player_id.strip_prefix(GUEST_PREFIX)?;
    let (gender, seq) = rest.rsplit_once('_')?;
    Some((Gender::parse(gender)?, seq.parse().ok()?))
}

/// Per-session values that outlive individual board mutations.
#[derive(Debug, Clone)]
pub struct SessionContext {
    club_id: String,
    date: Date,
    guest_seq: HashMap<Gender, u64>,
    notified: BTreeSet<PlayerId>,
}

impl SessionContext {
    /// Fresh session without guests or reported players.
    pub fn new(club_id: impl Into<String>, date: Date) -> Self {
        Self {
            club_id: club_id.into(),
            date,
            guest_seq: HashMap::new(),
            notified: BTreeSet::new(),
        }
    }

    /// Club of the session.
    pub fn club_id(&self) -> &str {
        &self.club_id
    }

    /// Session date.
    pub fn date(&self) -> Date {
        self.date
    }

    /// Session date as `YYYY-MM-DD`.
    pub fn date_key(&self) -> String {
        format_date(self.date)
    }

    /// Allocate the next guest id for `gender`; sequences start at 1 and never repeat.
    pub fn next_guest_id(&mut self, gender: Gender) -> PlayerId {
        let seq = self.guest_seq.entry(gender).or_default();
        *seq += 1;
        format!("{GUEST_PREFIX}{}_{}", gender.slug(), seq)
    }

    /// Make sure later guests are numbered past an id seen in a snapshot.
    pub fn observe_player_id(&mut self, player_id: &str) {
        if let Some((gender, seq)) = parse_guest_id(player_id) {
            let current = self.guest_seq.entry(gender).or_default();
            *current = (*current).max(seq);
        }
    }

    /// Whether `player_id` was already reported present.
    pub fn is_notified(&self, player_id: &str) -> bool {
        self.notified.contains(player_id)
    }

    /// Record a player as reported present; returns `false` when already known.
    pub fn mark_notified(&mut self, player_id: &str) -> bool {
        self.notified.insert(player_id.to_string())
    }

    /// Merge ids reported present elsewhere; returns `true` when any was new.
    pub fn seed_notified<I>(&mut self, ids: I) -> bool
    where
        I: IntoIterator<Item = PlayerId>,
    {
        let before = self.notified.len();
        self.notified.extend(ids);
        self.notified.len() != before
    }

    /// Reported ids in sorted order.
    pub fn notified_ids(&self) -> Vec<PlayerId> {
        self.notified.iter().cloned().collect()
    }

    /// Move the session to `date`. Returns `false` when the date is unchanged.
    ///
    /// Guest sequences are kept so ids stay unique for the process lifetime.
    pub fn roll_over(&mut self, date: Date) -> bool {
        if self.date == date {
            return false;
        }
        self.date = date;
        self.notified.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn guest_ids_are_sequential_per_gender() {
        let mut session = SessionContext::new("club", date!(2024 - 05 - 01));
        assert_eq!(session.next_guest_id(Gender::Male), "guest_male_1");
        assert_eq!(session.next_guest_id(Gender::Female), "guest_female_1");
        assert_eq!(session.next_guest_id(Gender::Male), "guest_male_2");
    }

    #[test]
    fn observed_guests_push_the_counter() {
        let mut session = SessionContext::new("club", date!(2024 - 05 - 01));
        session.observe_player_id("guest_female_4");
        session.observe_player_id("guest_female_2");
        session.observe_player_id("member-17");
        assert_eq!(session.next_guest_id(Gender::Female), "guest_female_5");
        assert_eq!(session.next_guest_id(Gender::Male), "guest_male_1");
    }

    #[test]
    fn rollover_clears_notified_but_keeps_guest_numbering() {
        let mut session = SessionContext::new("club", date!(2024 - 05 - 01));
        session.next_guest_id(Gender::Male);
        assert!(session.mark_notified("p1"));
        assert!(!session.mark_notified("p1"));

        assert!(!session.roll_over(date!(2024 - 05 - 01)));
        assert!(session.roll_over(date!(2024 - 05 - 02)));
        assert!(!session.is_notified("p1"));
        assert_eq!(session.next_guest_id(Gender::Male), "guest_male_2");
        assert_eq!(session.date_key(), "2024-05-02");
    }

    #[test]
    fn parse_guest_id_rejects_foreign_ids() {
        assert_eq!(parse_guest_id("guest_male_12"), Some((Gender::Male, 12)));
        assert_eq!(parse_guest_id("guest_x_1"), None);
        assert_eq!(parse_guest_id("m-1"), None);
    }
}
