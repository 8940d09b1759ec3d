use std::fmt;

/// Human names for the first five channels of a glove
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Little,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Little,
    ];

    pub fn from_channel(channel: usize) -> Option<Self> {
        Self::ALL.get(channel).copied()
    }

    pub fn channel(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        use Finger::*;
        match self {
            Thumb => "thumb",
            Index => "index",
            Middle => "middle",
            Ring => "ring",
            Little => "little",
        }
    }
}

impl fmt::Display for Finger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Label for any channel: the finger name when there is one, otherwise `ch<N>`.
pub fn channel_label(channel: usize) -> String {
    match Finger::from_channel(channel) {
        Some(finger) => finger.to_string(),
        None => format!("ch{}", channel),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_map_to_fingers_in_order() {
        assert_eq!(Finger::from_channel(0), Some(Finger::Thumb));
        assert_eq!(Finger::from_channel(4), Some(Finger::Little));
        assert_eq!(Finger::from_channel(5), None);
        assert_eq!(Finger::Ring.channel(), 3);
    }

    #[test]
    fn labels_fall_back_to_index() {
        assert_eq!(channel_label(1), "index");
        assert_eq!(channel_label(6), "ch6");
    }
}
