use std::fmt;

/// Which button produced a request.
///
/// Hall buttons carry the direction the passenger wants to travel in,
/// cab buttons do not: a cab call is served by any stop at its floor.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    HallUp = 0,
    HallDown = 1,
    Cab = 2,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Internal,
    External,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Up,
    Down,
}

impl Call {
    pub fn hall(intent: Intent) -> Self {
        match intent {
            Intent::Up => Call::HallUp,
            Intent::Down => Call::HallDown,
        }
    }

    pub fn kind(self) -> RequestKind {
        match self {
            Call::Cab => RequestKind::Internal,
            Call::HallUp | Call::HallDown => RequestKind::External,
        }
    }

    pub fn intent(self) -> Option<Intent> {
        match self {
            Call::HallUp => Some(Intent::Up),
            Call::HallDown => Some(Intent::Down),
            Call::Cab => None,
        }
    }

    pub fn is_hall(self) -> bool {
        self.kind() == RequestKind::External
    }

    pub const fn num_hall_calls() -> u8 {
        2
    }

    pub fn iter_hall() -> impl Iterator<Item = Call> {
        [Call::HallUp, Call::HallDown].iter().copied()
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Call::HallUp => "hall up",
            Call::HallDown => "hall down",
            Call::Cab => "cab",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Intent::Up),
            "down" | "d" => Ok(Intent::Down),
            other => Err(format!("unknown direction {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cab_calls_are_internal_and_carry_no_intent() {
        assert_eq!(Call::Cab.kind(), RequestKind::Internal);
        assert_eq!(Call::Cab.intent(), None);
    }

    #[test]
    fn hall_calls_always_carry_an_intent() {
        for call in Call::iter_hall() {
            assert_eq!(call.kind(), RequestKind::External);
            assert!(call.intent().is_some());
            assert_eq!(Call::hall(call.intent().unwrap()), call);
        }
    }

    #[test]
    fn intent_parses_short_and_long_names() {
        assert_eq!("UP".parse::<Intent>(), Ok(Intent::Up));
        assert_eq!("d".parse::<Intent>(), Ok(Intent::Down));
        assert!("sideways".parse::<Intent>().is_err());
    }
}
