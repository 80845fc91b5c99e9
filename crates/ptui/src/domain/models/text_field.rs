use thiserror::Error;

#[cfg(test)]
#[path = "text_field_test.rs"]
mod tests;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextFieldError {
    #[error("Invalid index position {index}, text is {len} characters long")]
    InvalidIndexPosition { index: usize, len: usize },
}

/// Single line text buffer with a cursor. The cursor counts characters, not bytes.
#[derive(Debug, Clone, Default)]
pub struct TextField {
    text: String,
    index: usize,
}

impl TextField {
    pub fn new() -> TextField {
        return TextField::default();
    }

    pub fn text(&self) -> String {
        return self.text.clone();
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.index = self.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.text.is_empty();
    }

    pub fn len(&self) -> usize {
        return self.text.chars().count();
    }

    pub fn index(&self) -> usize {
        return self.index;
    }

    /// Text left of the cursor.
    pub fn text_before_cursor(&self) -> &str {
        return &self.text[..self.byte_offset(self.index)];
    }

    pub fn set_index(&mut self, index: usize) -> Result<(), TextFieldError> {
        let len = self.len();
        if index > len {
            return Err(TextFieldError::InvalidIndexPosition { index, len });
        }

        self.index = index;
        return Ok(());
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.index = 0;
    }

    pub fn append_character(&mut self, character: char) {
        self.text.push(character);
        self.index = self.len();
    }

    pub fn append_string(&mut self, another_string: &str) {
        self.text.push_str(another_string);
        self.index = self.len();
    }

    pub fn insert_character(&mut self, character: char) {
        let offset = self.byte_offset(self.index);
        self.text.insert(offset, character);
        self.index += 1;
    }

    pub fn insert_string(&mut self, another_string: &str) {
        let offset = self.byte_offset(self.index);
        self.text.insert_str(offset, another_string);
        self.index += another_string.chars().count();
    }

    pub fn left(&mut self) {
        if self.index > 0 {
            self.index -= 1;
        }
    }

    pub fn right(&mut self) {
        if self.index < self.len() {
            self.index += 1;
        }
    }

    pub fn delete(&mut self) {
        if self.index < self.len() {
            let offset = self.byte_offset(self.index);
            self.text.remove(offset);
        }
    }

    pub fn backspace(&mut self) {
        if self.index > 0 {
            self.left();
            self.delete();
        }
    }

    pub fn end(&mut self) {
        self.index = self.len();
    }

    pub fn home(&mut self) {
        self.index = 0;
    }

    fn byte_offset(&self, index: usize) -> usize {
        return self
            .text
            .char_indices()
            .nth(index)
            .map(|(offset, _)| offset)
            .unwrap_or(self.text.len());
    }
}
