//! Sink backend enumeration.
//!
//! Provides the `SinkKind` enum for selecting which storage backends the
//! ingest loop writes to.

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    /// Wide-column product table (always the primary sink)
    Cassandra,
    /// Document-store collection
    MongoDB,
    /// Relational table
    PostgreSQL,
}

impl Default for SinkKind {
    fn default() -> Self {
        Self::Cassandra
    }
}

impl std::fmt::Display for SinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cassandra => write!(f, "cassandra"),
            Self::MongoDB => write!(f, "mongodb"),
            Self::PostgreSQL => write!(f, "postgresql"),
        }
    }
}

impl std::str::FromStr for SinkKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cassandra" | "astra" => Ok(Self::Cassandra),
            "mongodb" | "mongo" => Ok(Self::MongoDB),
            "postgresql" | "postgres" => Ok(Self::PostgreSQL),
            _ => Err(anyhow::anyhow!(
                "Invalid sink: '{s}'. Expected 'cassandra', 'mongodb' or 'postgresql'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_cassandra() {
        assert_eq!(SinkKind::default(), SinkKind::Cassandra);
    }

    #[test]
    fn test_display() {
        assert_eq!(SinkKind::Cassandra.to_string(), "cassandra");
        assert_eq!(SinkKind::MongoDB.to_string(), "mongodb");
        assert_eq!(SinkKind::PostgreSQL.to_string(), "postgresql");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("cassandra".parse::<SinkKind>().unwrap(), SinkKind::Cassandra);
        assert_eq!("Mongo".parse::<SinkKind>().unwrap(), SinkKind::MongoDB);
        assert_eq!(" postgres ".parse::<SinkKind>().unwrap(), SinkKind::PostgreSQL);
        assert!("redis".parse::<SinkKind>().is_err());
    }
}
