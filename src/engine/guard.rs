//! Staleness guards for asynchronous results.
//!
//! Each concern keeps one [`Latest`]. Issuing a request hands out a
//! [`Ticket`] carrying a sequence number and the inputs it was issued for;
//! when the result comes back it may only be committed if its ticket is still
//! the guard's current one.

/// Identity of one issued request.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket<K> {
    seq: u64,
    key: K,
}

impl<K> Ticket<K> {
    /// Inputs the request was issued for.
    pub const fn key(&self) -> &K {
        &self.key
    }

    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone)]
pub struct Latest<K> {
    next_seq: u64,
    current: Option<Ticket<K>>,
    in_flight: bool,
}

impl<K> Default for Latest<K> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            current: None,
            in_flight: false,
        }
    }
}

impl<K: Clone + PartialEq> Latest<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersede whatever is outstanding and issue a new ticket for `key`.
    pub fn issue(&mut self, key: K) -> Ticket<K> {
        self.next_seq += 1;
        let ticket = Ticket {
            seq: self.next_seq,
            key,
        };
        self.current = Some(ticket.clone());
        self.in_flight = true;
        ticket
    }

    #[must_use]
    pub fn is_current(&self, ticket: &Ticket<K>) -> bool {
        self.current.as_ref() == Some(ticket)
    }

    /// Mark `ticket` as completed. Returns true only for the current
    /// in-flight ticket; the caller commits its result in that case.
    pub fn settle(&mut self, ticket: &Ticket<K>) -> bool {
        if self.in_flight && self.is_current(ticket) {
            self.in_flight = false;
            true
        } else {
            false
        }
    }

    /// Forget the current ticket; any outstanding result becomes stale.
    pub fn invalidate(&mut self) {
        self.current = None;
        self.in_flight = false;
    }

    /// Make a ticket issued elsewhere the current one.
    pub fn adopt(&mut self, ticket: Ticket<K>) {
        self.current = Some(ticket);
        self.in_flight = true;
    }

    /// Inputs of the current ticket, settled or not.
    pub fn key(&self) -> Option<&K> {
        self.current.as_ref().map(|ticket| &ticket.key)
    }

    /// The current ticket, if it has not completed yet.
    pub fn pending(&self) -> Option<&Ticket<K>> {
        self.current.as_ref().filter(|_| self.in_flight)
    }

    #[must_use]
    pub const fn in_flight(&self) -> bool {
        self.in_flight
    }
}
