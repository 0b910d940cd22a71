use std::fmt::Display;

/// Handle for one in-flight fetch; only the newest ticket may publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    Stale,
    Unavailable,
}

#[derive(Debug, PartialEq)]
pub enum ViewState<'a, T> {
    Ready(&'a T),
    Pending,
    NoData,
}

/// Last-request-wins gate in front of a derived view.
#[derive(Debug)]
pub struct ReportRefresh<T> {
    generation: u64,
    in_flight: bool,
    current: Option<T>,
    last_error: Option<String>,
}

impl<T> Default for ReportRefresh<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            in_flight: false,
            current: None,
            last_error: None,
        }
    }
}

impl<T> ReportRefresh<T> {
    pub fn begin(&mut self) -> RefreshTicket {
        self.generation += 1;
        self.in_flight = true;
        RefreshTicket(self.generation)
    }

    /// Failures keep the previously applied view.
    pub fn complete<E: Display>(
        &mut self,
        ticket: RefreshTicket,
        result: Result<T, E>,
    ) -> RefreshOutcome {
        if ticket.0 != self.generation {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.generation,
                "discarding stale refresh"
            );
            return RefreshOutcome::Stale;
        }

        self.in_flight = false;
        match result {
            Ok(value) => {
                self.current = Some(value);
                self.last_error = None;
                RefreshOutcome::Applied
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                RefreshOutcome::Unavailable
            }
        }
    }

    pub fn state(&self) -> ViewState<'_, T> {
        match (&self.current, self.in_flight) {
            (Some(value), _) => ViewState::Ready(value),
            (None, true) => ViewState::Pending,
            (None, false) => ViewState::NoData,
        }
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}
