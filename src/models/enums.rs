use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

// Slide classification outcome. Unset means no image has ever been
// classified for the record; it is not an error state.
str_enum!(ImageVerdict {
    Positive => "positive",
    Negative => "negative",
    Unset => "unset",
});

// Record lifecycle. Created exists only in memory between intake and the
// first insert; the store never holds it (enforced by a schema CHECK).
str_enum!(RecordState {
    Created => "created",
    AdvisoryReady => "advisory_ready",
    ImageClassified => "image_classified",
    Reclassified => "reclassified",
});
