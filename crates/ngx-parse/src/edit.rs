use text_size::{TextRange, TextSize};

/// Replaces `delete` with `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub delete: TextRange,
    pub insert: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("edit range {range:?} is out of bounds for a text of length {len:?}")]
    OutOfBounds { range: TextRange, len: TextSize },
    #[error("edit offset {offset:?} is not on a char boundary")]
    NotCharBoundary { offset: TextSize },
}

impl TextEdit {
    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self { delete: TextRange::empty(offset), insert: text.into() }
    }

    pub fn delete(range: TextRange) -> Self {
        Self { delete: range, insert: String::new() }
    }

    pub fn replace(range: TextRange, text: impl Into<String>) -> Self {
        Self { delete: range, insert: text.into() }
    }

    /// Checks that the edit fits `text`.
    pub fn validate(&self, text: &str) -> Result<(), EditError> {
        let len = TextSize::of(text);
        if self.delete.end() > len {
            return Err(EditError::OutOfBounds { range: self.delete, len });
        }
        for offset in [self.delete.start(), self.delete.end()] {
            if !text.is_char_boundary(offset.into()) {
                return Err(EditError::NotCharBoundary { offset });
            }
        }
        Ok(())
    }

    /// Returns the edited copy of `text`.
    pub fn apply(&self, text: &str) -> Result<String, EditError> {
        self.validate(text)?;
        let mut edited = String::with_capacity(text.len() + self.insert.len());
        edited.push_str(&text[..usize::from(self.delete.start())]);
        edited.push_str(&self.insert);
        edited.push_str(&text[usize::from(self.delete.end())..]);
        Ok(edited)
    }

    pub fn insert_len(&self) -> TextSize {
        TextSize::of(self.insert.as_str())
    }
}
