#[derive(Debug, Clone, PartialEq)]
struct DialogBlock {
    speaker: String,
    pages: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialogState {
    Idle,
    Reading,
}

/// Multi-block, multi-page text sequencer with a character-counted
/// typewriter reveal. `tick` runs once per simulation tick while Reading;
/// `skip_page` is bound to the interact key and jumps a whole page.
#[derive(Debug, Clone, PartialEq)]
struct DialogSession {
    blocks: Vec<DialogBlock>,
    block_cursor: usize,
    page_cursor: usize,
    char_cursor: usize,
    state: DialogState,
}

impl Default for DialogSession {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            block_cursor: 0,
            page_cursor: 0,
            char_cursor: 0,
            state: DialogState::Idle,
        }
    }
}

impl DialogSession {
    fn start(&mut self, blocks: Vec<DialogBlock>) {
        self.blocks = blocks
            .into_iter()
            .filter(|block| !block.pages.is_empty())
            .collect();
        self.block_cursor = 0;
        self.page_cursor = 0;
        self.char_cursor = 0;
        self.state = if self.blocks.is_empty() {
            DialogState::Idle
        } else {
            DialogState::Reading
        };
    }

    fn is_active(&self) -> bool {
        self.state == DialogState::Reading
    }

    fn current_speaker(&self) -> Option<&str> {
        if !self.is_active() {
            return None;
        }
        self.blocks
            .get(self.block_cursor)
            .map(|block| block.speaker.as_str())
    }

    fn current_page(&self) -> Option<&str> {
        if !self.is_active() {
            return None;
        }
        self.blocks
            .get(self.block_cursor)
            .and_then(|block| block.pages.get(self.page_cursor))
            .map(String::as_str)
    }

    /// Characters of the current page revealed so far, never more than the
    /// page length.
    fn revealed_chars(&self) -> usize {
        let page_len = self
            .current_page()
            .map(|page| page.chars().count())
            .unwrap_or(0);
        self.char_cursor.min(page_len)
    }

    fn tick(&mut self) {
        if self.state != DialogState::Reading {
            return;
        }
        let page_len = self
            .current_page()
            .map(|page| page.chars().count())
            .unwrap_or(0);

        self.char_cursor += 1;
        if self.char_cursor >= page_len {
            self.advance_page();
        }
    }

    /// Immediate page advance regardless of the reveal cursor.
    fn skip_page(&mut self) {
        if self.state != DialogState::Reading {
            return;
        }
        self.advance_page();
    }

    fn advance_page(&mut self) {
        self.char_cursor = 0;
        self.page_cursor += 1;

        let block_page_count = self
            .blocks
            .get(self.block_cursor)
            .map(|block| block.pages.len())
            .unwrap_or(0);
        if self.page_cursor < block_page_count {
            return;
        }

        self.page_cursor = 0;
        self.block_cursor += 1;
        if self.block_cursor >= self.blocks.len() {
            self.blocks.clear();
            self.block_cursor = 0;
            self.state = DialogState::Idle;
        }
    }
}
