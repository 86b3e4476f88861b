/// The from/to pair the search runs on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    from: Option<String>,
    to: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    From,
    To,
}

fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl Selection {
    pub fn new(from: Option<&str>, to: Option<&str>) -> Self {
        Self {
            from: from.and_then(|s| non_empty(s)),
            to: to.and_then(|s| non_empty(s)),
        }
    }

    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    pub fn get(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::From => self.from(),
            Slot::To => self.to(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }

    /// Overwrite one endpoint with raw input text. Blank text clears it.
    pub fn set(&mut self, slot: Slot, value: impl Into<String>) {
        let value = non_empty(value);
        match slot {
            Slot::From => self.from = value,
            Slot::To => self.to = value,
        }
    }

    pub fn clear(&mut self, slot: Slot) {
        match slot {
            Slot::From => self.from = None,
            Slot::To => self.to = None,
        }
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
    }

    /// A station picked on the map: it starts a new pair when `from` is empty
    /// or the pair is already complete, otherwise it completes the pair.
    pub fn pick(&mut self, station: impl Into<String>) -> Slot {
        let station = station.into();
        if self.from.is_none() || self.is_complete() {
            self.from = Some(station);
            self.to = None;
            Slot::From
        } else {
            self.to = Some(station);
            Slot::To
        }
    }
}
