/// Highlighted row of a list, kept within the bounds of the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    index: usize,
    len: usize,
}

impl Selection {
    pub fn index(&self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }

        return Some(self.index);
    }

    pub fn len(&self) -> usize {
        return self.len;
    }

    pub fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if len == 0 {
            self.index = 0;
        } else if self.index >= len {
            self.index = len - 1;
        }
    }

    pub fn reset(&mut self, len: usize) {
        self.index = 0;
        self.set_len(len);
    }

    pub fn select(&mut self, index: usize) {
        if index < self.len {
            self.index = index;
        }
    }

    pub fn up(&mut self) {
        if self.index > 0 {
            self.index -= 1;
        }
    }

    pub fn down(&mut self) {
        if self.index + 1 < self.len {
            self.index += 1;
        }
    }

    pub fn first(&mut self) {
        self.index = 0;
    }

    pub fn last(&mut self) {
        self.index = self.len.saturating_sub(1);
    }

    /// Picks the selected element out of `items`.
    pub fn selected<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        return self.index().and_then(|index| items.get(index));
    }
}
