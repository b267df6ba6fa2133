use std::fmt;
use std::str::FromStr;

pub mod entity;

/// The closed set of object types the console recognizes. Reload uses it as
/// the registration table; any other name is rejected with
/// "class doesn't exist".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    BaseModel,
    User,
    State,
    City,
    Amenity,
    Place,
    Review,
}

impl Kind {
    pub const ALL: [Self; 7] = [
        Self::BaseModel,
        Self::User,
        Self::State,
        Self::City,
        Self::Amenity,
        Self::Place,
        Self::Review,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::BaseModel => "BaseModel",
            Self::User => "User",
            Self::State => "State",
            Self::City => "City",
            Self::Amenity => "Amenity",
            Self::Place => "Place",
            Self::Review => "Review",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Kind {
    type Err = ();

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "BaseModel" => Ok(Self::BaseModel),
            "User" => Ok(Self::User),
            "State" => Ok(Self::State),
            "City" => Ok(Self::City),
            "Amenity" => Ok(Self::Amenity),
            "Place" => Ok(Self::Place),
            "Review" => Ok(Self::Review),
            _ => Err(()),
        }
    }
}
