use std::fmt;

use crate::error::{AuthError, AuthResult};

const DELIMITER: char = '.';

/// A compact-serialized token split into header, claims and signature.
///
/// The parts own one copy of the token text; the accessors are views over
/// index ranges of that copy, so the caller's buffer is never touched and no
/// segment is copied again.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenParts {
    text: Box<str>,
    first_dot: usize,
    second_dot: usize,
}

impl TokenParts {
    /// Split `token` at its first two delimiters.
    ///
    /// Every segment must be non-empty. Delimiters after the second one are
    /// left in the signature segment.
    pub fn split(token: &str) -> AuthResult<Self> {
        let text: Box<str> = token.into();

        let first_dot = text.find(DELIMITER).ok_or(AuthError::MalformedToken)?;
        if first_dot == 0 || first_dot + 1 >= text.len() {
            return Err(AuthError::MalformedToken);
        }

        let second_dot = text[first_dot + 1..]
            .find(DELIMITER)
            .map(|offset| first_dot + 1 + offset)
            .ok_or(AuthError::MalformedToken)?;
        if second_dot == first_dot + 1 || second_dot + 1 >= text.len() {
            return Err(AuthError::MalformedToken);
        }

        Ok(Self {
            text,
            first_dot,
            second_dot,
        })
    }

    /// Header segment, still encoded.
    pub fn header(&self) -> &str {
        &self.text[..self.first_dot]
    }

    /// Claims segment, still encoded.
    pub fn claims(&self) -> &str {
        &self.text[self.first_dot + 1..self.second_dot]
    }

    /// Everything after the second delimiter.
    pub fn signature(&self) -> &str {
        &self.text[self.second_dot + 1..]
    }

    /// `header.claims` exactly as it appeared in the token.
    pub fn signing_input(&self) -> &str {
        &self.text[..self.second_dot]
    }
}

impl fmt::Debug for TokenParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenParts")
            .field("header", &self.header())
            .field("claims", &self.claims())
            .field("signature", &"***")
            .finish()
    }
}
