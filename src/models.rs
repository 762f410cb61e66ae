use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// One of the three independently serialized sources a profile document carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Resume,
    Github,
    Linkedin,
}

impl ProfileField {
    /// Fields in the order grounding material is emitted
    pub const ALL: [Self; 3] = [Self::Resume, Self::Github, Self::Linkedin];

    /// Stored column / JSON key name
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Resume => "resume_data",
            Self::Github => "github_data",
            Self::Linkedin => "linkedin_data",
        }
    }
}

/// A retrieved profile document, projected down to its data fields and score
///
/// Each data field holds a JSON document encoded as a string. Fields are
/// parsed independently by the consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProfileDocument {
    pub resume_data: Option<String>,
    pub github_data: Option<String>,
    pub linkedin_data: Option<String>,
    /// Similarity to the query, higher is more relevant
    pub score: f64,
}

impl ProfileDocument {
    /// Raw JSON string stored for a field, if present
    #[must_use]
    pub fn field(&self, field: ProfileField) -> Option<&str> {
        match field {
            ProfileField::Resume => self.resume_data.as_deref(),
            ProfileField::Github => self.github_data.as_deref(),
            ProfileField::Linkedin => self.linkedin_data.as_deref(),
        }
    }
}

/// Speaker of a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl Role {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Bot => "Bot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Conversation state kept for one session identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub turns: Vec<Turn>,
    /// Raw transcript in `User: ...\nBot: ...` form
    pub transcript: String,
    /// Whitespace-delimited word count of `transcript`
    pub token_count: usize,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            turns: Vec::new(),
            transcript: String::new(),
            token_count: 0,
            created_at: now,
            last_activity: now,
        }
    }

    /// Record one exchange in both the structured and raw transcript
    pub fn append_exchange(&mut self, message: &str, response: &str) {
        let now = Utc::now();
        let entry = format!("User: {message}\nBot: {response}");
        if self.transcript.is_empty() {
            self.transcript = entry.clone();
        } else {
            self.transcript.push('\n');
            self.transcript.push_str(&entry);
        }
        // Entries are newline-separated, so word counts add up exactly.
        self.token_count += count_tokens(&entry);

        self.turns.push(Turn {
            role: Role::User,
            text: message.to_string(),
            at: now,
        });
        self.turns.push(Turn {
            role: Role::Bot,
            text: response.to_string(),
            at: now,
        });
        self.last_activity = now;
    }

    #[must_use]
    pub fn idle_for(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.last_activity
    }
}

/// Whitespace-delimited word count used as the token estimate
#[must_use]
pub fn count_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_exchange_has_no_leading_newline() {
        let mut session = Session::new("s1");
        session.append_exchange("Hi", "Hello!");
        assert_eq!(session.transcript, "User: Hi\nBot: Hello!");
        assert_eq!(session.turns.len(), 2);
        assert_eq!(session.turns[0].role, Role::User);
        assert_eq!(session.turns[1].role, Role::Bot);
    }

    #[test]
    fn test_later_exchanges_are_newline_separated() {
        let mut session = Session::new("s1");
        session.append_exchange("Hi", "Hello!");
        session.append_exchange("Skills?", "Rust and Go.");
        assert_eq!(
            session.transcript,
            "User: Hi\nBot: Hello!\nUser: Skills?\nBot: Rust and Go."
        );
        assert_eq!(session.token_count, 10);
    }

    #[test]
    fn test_running_token_count_matches_full_recount() {
        let mut session = Session::new("s1");
        for i in 0..50 {
            session.append_exchange(&format!("  question {i}\n"), "");
            session.append_exchange("multi word\tmessage", &format!("answer {i} "));
        }
        assert_eq!(session.token_count, count_tokens(&session.transcript));
        assert_eq!(session.turns.len(), 200);
    }

    #[test]
    fn test_field_lookup_follows_declared_order() {
        let doc = ProfileDocument {
            resume_data: Some("{}".into()),
            github_data: None,
            linkedin_data: Some("[]".into()),
            score: 0.9,
        };
        let present: Vec<_> = ProfileField::ALL
            .iter()
            .filter_map(|f| doc.field(*f).map(|_| f.key()))
            .collect();
        assert_eq!(present, vec!["resume_data", "linkedin_data"]);
    }

    #[test]
    fn test_count_tokens_ignores_extra_whitespace() {
        assert_eq!(count_tokens("  a \n b\t c  "), 3);
        assert_eq!(count_tokens(""), 0);
    }
}
