/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty
    #[error("file name cannot be empty")]
    Empty,
    /// The input is a relative path component (`.` or `..`)
    #[error("file name cannot be '{0}'")]
    Reserved(String),
    /// The input contains a path separator or NUL byte
    #[error("file name must not contain '/', '\\' or NUL: '{0}'")]
    Separator(String),
}

/// A file name that is guaranteed to be a single path component.
///
/// Upload file names arrive verbatim from the `X-JOB-FILENAME` header and are joined onto a job
/// directory, so anything that could climb out of that directory is refused. The value is not
/// trimmed or otherwise rewritten: what the caller sent is what lands on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileName(String);

impl FileName {
    /// Creates a new `FileName` from the given input.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] for an empty string, [`TextError::Reserved`] for `.` and
    /// `..`, and [`TextError::Separator`] if the input contains `/`, `\` or a NUL byte.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let input = input.as_ref();
        if input.is_empty() {
            return Err(TextError::Empty);
        }
        if input == "." || input == ".." {
            return Err(TextError::Reserved(input.to_owned()));
        }
        if input.contains(['/', '\\', '\0']) {
            return Err(TextError::Separator(input.to_owned()));
        }
        Ok(Self(input.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for FileName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for FileName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FileName::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Which side of a job a file belongs to.
///
/// Uploads without a job ID start a new job and land in `input`; uploads against an existing
/// job ID land in `output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    /// Both directions, in the order their directories are created.
    pub const ALL: [Direction; 2] = [Direction::Input, Direction::Output];

    /// Directory name used on disk and in retrieval URIs.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
