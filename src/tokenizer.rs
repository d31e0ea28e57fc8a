//! The line/field state machine. This is the bulk of the crate: everything
//! else (config, buffers, the line skipper) exists to support [`Tokenizer`].
//!
//! The machine has eight states and is driven one byte at a time. Several
//! states fall through into the next without consuming another byte — e.g.
//! `START_LINE` immediately re-examines the same byte as `START_FIELD` once
//! it has decided "this line has content". [`Tokenizer::process_byte`] models
//! that with a loop that re-dispatches on `self.state` until a state change
//! claims the byte for real.

use log::{debug, trace};

use crate::buffer::ColumnBuffer;
use crate::config::TokenizerConfig;
use crate::cursor::Cursor;
use crate::errors::{ErrorCode, Result, TokenizeErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StartLine,
    StartField,
    Field,
    StartQuotedField,
    QuotedFieldNewline,
    QuotedField,
    Comment,
    CarriageReturn,
}

enum LineOutcome {
    Continue,
    Done,
}

/// Tokenizes delimited text into packed per-column byte buffers.
///
/// A `Tokenizer` is reusable: [`set_source`](Tokenizer::set_source) points it
/// at a new input, and [`tokenize`](Tokenizer::tokenize) can be called
/// repeatedly on the same source to consume it in row-limited chunks (the
/// cursor position persists between calls unless `set_source` resets it).
pub struct Tokenizer<'a> {
    config: TokenizerConfig,
    cursor: Cursor<'a>,

    num_cols: usize,
    columns: Vec<ColumnBuffer>,
    num_rows: usize,
    code: ErrorCode,

    state: State,
    old_state: State,
    col: usize,
    whitespace: bool,
    field_start: usize,

    /// `None` in header mode: the delimiter stops being special and the
    /// whole line is captured as one field. See the header-mode note on
    /// [`Tokenizer::tokenize`].
    active_delim: Option<u8>,
    active_quote: Option<u8>,

    iter_col: usize,
    iter_pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(config: TokenizerConfig) -> Self {
        Tokenizer {
            config,
            cursor: Cursor::new(&[]),
            num_cols: 0,
            columns: Vec::new(),
            num_rows: 0,
            code: ErrorCode::NoError,
            state: State::StartLine,
            old_state: State::StartLine,
            col: 0,
            whitespace: true,
            field_start: 0,
            active_delim: None,
            active_quote: None,
            iter_col: 0,
            iter_pos: 0,
        }
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Points the tokenizer at a new input and resets the cursor to byte 0.
    /// Any previously tokenized output is left in place until the next
    /// `tokenize` call reallocates it.
    pub fn set_source(&mut self, source: &'a [u8]) {
        self.cursor.set_source(source);
    }

    pub fn last_error(&self) -> ErrorCode {
        self.code
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Advances the cursor past `offset` significant lines without
    /// tokenizing them. See [`crate::skip_lines`].
    pub fn skip_lines(&mut self, offset: usize, header: bool) -> Result<()> {
        let res = crate::skip_lines::skip_lines(
            &mut self.cursor,
            self.config.comment,
            self.config.strip_whitespace_lines,
            offset,
            header,
        );
        match res {
            Ok(()) => {
                self.code = ErrorCode::NoError;
                Ok(())
            }
            Err(e) => {
                self.code = e.code();
                Err(e.into())
            }
        }
    }

    /// Tokenizes up to `end` rows (`None` for "until input is exhausted")
    /// starting from the cursor's current position.
    ///
    /// In header mode, `num_cols` is forced to 1 and the delimiter and quote
    /// character lose their special meaning: the entire line, byte for byte,
    /// becomes the single field in column 0, and tokenizing stops as soon as
    /// that line's terminator is reached, regardless of `end`. Splitting the
    /// captured header line on the delimiter is the caller's job (typically
    /// a second `tokenize` call with `header: false` over just that line).
    pub fn tokenize(&mut self, end: Option<usize>, header: bool, num_cols: usize) -> Result<()> {
        self.num_cols = if header { 1 } else { num_cols };
        self.columns = (0..self.num_cols).map(|_| ColumnBuffer::new()).collect();
        self.num_rows = 0;
        self.code = ErrorCode::NoError;
        self.active_delim = if header { None } else { Some(self.config.delimiter) };
        self.active_quote = if header { None } else { Some(self.config.quotechar) };

        if end == Some(0) {
            return Ok(());
        }

        self.state = State::StartLine;
        self.old_state = State::StartLine;
        self.col = 0;
        self.whitespace = true;

        let mut parse_newline = false;
        while !self.cursor.is_done() {
            let c = if parse_newline { b'\n' } else { self.cursor.current() };
            parse_newline = false;

            match self.process_byte(c, end, header, &mut parse_newline) {
                Ok(LineOutcome::Continue) => {}
                Ok(LineOutcome::Done) => {
                    debug!(
                        "tokenize finished: header={} rows={} cols={}",
                        header, self.num_rows, self.num_cols
                    );
                    return Ok(());
                }
                Err(e) => {
                    trace!("tokenize stopped at row {}: {}", self.num_rows, e);
                    self.code = e.code();
                    return Err(e.into());
                }
            }
            self.cursor.advance();
        }

        debug!(
            "tokenize finished: header={} rows={} cols={}",
            header, self.num_rows, self.num_cols
        );
        Ok(())
    }

    /// Entering `START_FIELD` past `num_cols` is harmless by itself — a run
    /// of delimiters can still be nothing but trailing separators before a
    /// line ends. It only becomes `TooManyCols` once something tries to
    /// actually write to that column, in [`push_byte`](Self::push_byte) or
    /// [`end_field`](Self::end_field); column buffers have exactly
    /// `num_cols` slots, so nothing past here may index one out of range.
    fn begin_field(&mut self) {
        self.state = State::StartField;
        self.whitespace = true;
        if self.col < self.num_cols {
            self.field_start = self.columns[self.col].write_pos();
        }
    }

    fn too_many_cols(&self) -> TokenizeErrorKind {
        TokenizeErrorKind::TooManyCols {
            row: self.num_rows,
            num_cols: self.num_cols,
        }
    }

    fn end_field(&mut self, header: bool) -> std::result::Result<(), TokenizeErrorKind> {
        if self.col >= self.num_cols {
            return Err(self.too_many_cols());
        }
        self.columns[self.col].end_field(self.field_start, self.config.strip_whitespace_fields);
        if !header {
            self.col += 1;
        }
        Ok(())
    }

    fn push_byte(&mut self, c: u8) -> std::result::Result<(), TokenizeErrorKind> {
        if self.col >= self.num_cols {
            return Err(self.too_many_cols());
        }
        self.columns[self.col].push(c);
        Ok(())
    }

    /// Dispatches one byte, looping internally for the handful of states
    /// that fall through to another without consuming a new byte. Returns
    /// whether tokenizing should stop here; `parse_newline_next` is set when
    /// a bare `\r` needs the next outer iteration to treat the just-stepped
    /// back-over byte as a newline.
    fn process_byte(
        &mut self,
        c: u8,
        end: Option<usize>,
        header: bool,
        parse_newline_next: &mut bool,
    ) -> std::result::Result<LineOutcome, TokenizeErrorKind> {
        loop {
            match self.state {
                State::StartLine => {
                    if c == b'\n' {
                        return Ok(LineOutcome::Continue);
                    } else if c == b'\r' {
                        self.old_state = State::StartLine;
                        self.state = State::CarriageReturn;
                        return Ok(LineOutcome::Continue);
                    } else if matches!(c, b' ' | b'\t') && self.config.strip_whitespace_lines {
                        return Ok(LineOutcome::Continue);
                    } else if self.config.comment != 0 && c == self.config.comment {
                        trace!("comment line at row {}", self.num_rows);
                        self.state = State::Comment;
                        return Ok(LineOutcome::Continue);
                    } else {
                        self.col = 0;
                        self.begin_field();
                        continue;
                    }
                }

                State::StartField => {
                    if matches!(c, b' ' | b'\t') && self.config.strip_whitespace_fields {
                        return Ok(LineOutcome::Continue);
                    } else if !self.config.strip_whitespace_lines
                        && self.config.comment != 0
                        && c == self.config.comment
                    {
                        self.state = State::Comment;
                        return Ok(LineOutcome::Continue);
                    } else if Some(c) == self.active_delim {
                        self.end_field(header)?;
                        self.begin_field();
                        return Ok(LineOutcome::Continue);
                    } else if c == b'\r' {
                        self.old_state = State::StartField;
                        self.state = State::CarriageReturn;
                        return Ok(LineOutcome::Continue);
                    } else if c == b'\n' {
                        self.handle_start_field_newline(header)?;
                        let outcome = self.end_line(end, header)?;
                        self.state = State::StartLine;
                        return Ok(outcome);
                    } else if Some(c) == self.active_quote {
                        self.state = State::StartQuotedField;
                        return Ok(LineOutcome::Continue);
                    } else {
                        if self.col >= self.num_cols {
                            return Err(self.too_many_cols());
                        }
                        self.state = State::Field;
                        continue;
                    }
                }

                State::Field => {
                    if self.config.comment != 0
                        && c == self.config.comment
                        && self.whitespace
                        && self.col == 0
                    {
                        self.state = State::Comment;
                        return Ok(LineOutcome::Continue);
                    } else if Some(c) == self.active_delim {
                        self.end_field(header)?;
                        self.begin_field();
                        return Ok(LineOutcome::Continue);
                    } else if c == b'\r' {
                        self.old_state = State::Field;
                        self.state = State::CarriageReturn;
                        return Ok(LineOutcome::Continue);
                    } else if c == b'\n' {
                        self.end_field(header)?;
                        let outcome = self.end_line(end, header)?;
                        self.state = State::StartLine;
                        return Ok(outcome);
                    } else {
                        if !matches!(c, b' ' | b'\t') {
                            self.whitespace = false;
                        }
                        self.push_byte(c)?;
                        return Ok(LineOutcome::Continue);
                    }
                }

                State::StartQuotedField => {
                    if matches!(c, b' ' | b'\t') && self.config.strip_whitespace_fields {
                        return Ok(LineOutcome::Continue);
                    } else if Some(c) == self.active_quote {
                        // Empty quotes, "". Closing here is no different from
                        // closing a quoted field that did accumulate content:
                        // hand off to FIELD and let the real delimiter (or
                        // newline) that follows close the field. Ending it
                        // here instead would make that delimiter open a
                        // second, spurious empty field.
                        self.state = State::Field;
                        return Ok(LineOutcome::Continue);
                    } else {
                        self.state = State::QuotedField;
                        continue;
                    }
                }

                State::QuotedFieldNewline => {
                    if (matches!(c, b' ' | b'\t') && self.config.strip_whitespace_lines)
                        || c == b'\n'
                    {
                        return Ok(LineOutcome::Continue);
                    } else if c == b'\r' {
                        self.old_state = State::QuotedFieldNewline;
                        self.state = State::CarriageReturn;
                        return Ok(LineOutcome::Continue);
                    } else if Some(c) == self.active_quote {
                        self.state = State::Field;
                        return Ok(LineOutcome::Continue);
                    } else {
                        self.state = State::QuotedField;
                        continue;
                    }
                }

                State::QuotedField => {
                    if Some(c) == self.active_quote {
                        self.state = State::Field;
                        return Ok(LineOutcome::Continue);
                    } else if c == b'\n' {
                        self.state = State::QuotedFieldNewline;
                        return Ok(LineOutcome::Continue);
                    } else if c == b'\r' {
                        self.old_state = State::QuotedField;
                        self.state = State::CarriageReturn;
                        return Ok(LineOutcome::Continue);
                    } else {
                        self.push_byte(c)?;
                        return Ok(LineOutcome::Continue);
                    }
                }

                State::Comment => {
                    if c == b'\n' {
                        self.state = State::StartLine;
                        return Ok(LineOutcome::Continue);
                    } else if c == b'\r' {
                        self.old_state = State::Comment;
                        self.state = State::CarriageReturn;
                        return Ok(LineOutcome::Continue);
                    } else {
                        return Ok(LineOutcome::Continue);
                    }
                }

                State::CarriageReturn => {
                    self.state = self.old_state;
                    self.cursor.step_back();
                    if c != b'\n' {
                        // Bare \r: back up once more so the next outer
                        // iteration re-parses it, forced to '\n'.
                        self.cursor.step_back();
                        *parse_newline_next = true;
                    }
                    return Ok(LineOutcome::Continue);
                }
            }
        }
    }

    /// Implements the whitespace-delimited newline edge case: reaching `\n`
    /// while still in `START_FIELD` means the field-so-far is empty (all of
    /// it, if any, was silently skipped by the left-strip above). When line
    /// stripping is off we can't just drop it — any whitespace between the
    /// last delimiter and the newline has to be recovered and handed to the
    /// ordinary field-close path, which decides whether it's truly empty.
    fn handle_start_field_newline(&mut self, header: bool) -> std::result::Result<(), TokenizeErrorKind> {
        if self.config.strip_whitespace_lines {
            if matches!(self.active_delim, Some(b' ') | Some(b'\t')) {
                // Trailing whitespace before EOL with a whitespace delimiter:
                // never emit a spurious trailing empty field.
                return Ok(());
            }
            self.end_field(header)?;
            return Ok(());
        }

        let newline_pos = self.cursor.pos();
        let mut boundary = None;
        for pos in (0..newline_pos).rev() {
            let b = self.cursor.byte_at(pos);
            let is_boundary = match (b, self.active_delim) {
                (Some(d), Some(delim)) if d == delim => true,
                _ => matches!(b, Some(b'\n') | Some(b'\r')),
            };
            if is_boundary {
                boundary = Some(pos);
                break;
            }
        }

        let Some(boundary) = boundary else {
            // Walked all the way to the start of input with no delimiter or
            // newline in between: nothing to recover, field stays empty.
            return Ok(());
        };

        let content_start = boundary + 1;
        if content_start == newline_pos {
            // No whitespace between the delimiter and the newline.
            return Ok(());
        }

        for p in content_start..newline_pos {
            let b = self.cursor.byte_at(p).expect("within source bounds");
            self.push_byte(b)?;
        }
        self.end_field(header)?;
        Ok(())
    }

    fn end_line(
        &mut self,
        end: Option<usize>,
        header: bool,
    ) -> std::result::Result<LineOutcome, TokenizeErrorKind> {
        if header {
            self.cursor.advance();
            return Ok(LineOutcome::Done);
        }

        if self.config.fill_extra_cols {
            if self.col < self.num_cols {
                trace!(
                    "row {} padded from {} to {} columns",
                    self.num_rows, self.col, self.num_cols
                );
            }
            while self.col < self.num_cols {
                self.field_start = self.columns[self.col].write_pos();
                self.end_field(false)?;
            }
        } else if self.col < self.num_cols {
            return Err(TokenizeErrorKind::NotEnoughCols {
                row: self.num_rows,
                found: self.col,
                num_cols: self.num_cols,
            });
        }

        self.num_rows += 1;
        self.old_state = State::StartLine;

        if let Some(end) = end {
            if self.num_rows == end {
                self.cursor.advance();
                return Ok(LineOutcome::Done);
            }
        }
        Ok(LineOutcome::Continue)
    }

    // --- Field iteration -------------------------------------------------

    /// Positions iteration at the first field of `col`. Call once per column
    /// before [`next_field`](Tokenizer::next_field).
    pub fn start_iteration(&mut self, col: usize) {
        self.iter_col = col;
        self.iter_pos = 0;
    }

    /// Returns the next field's bytes (possibly empty), or `None` once every
    /// row's field in this column has been consumed.
    pub fn next_field(&mut self) -> Option<&[u8]> {
        if self.finished_iteration() {
            return None;
        }
        let buf = &self.columns[self.iter_col];
        let slice = buf.as_slice();
        let start = self.iter_pos;

        if slice[start] == crate::buffer::EMPTY_FIELD_SENTINEL {
            self.iter_pos = start + 2; // sentinel + terminator
            return Some(&slice[start + 1..start + 1]);
        }

        let mut end = start;
        while slice[end] != crate::buffer::FIELD_TERMINATOR {
            end += 1;
        }
        self.iter_pos = end + 1;
        Some(&slice[start..end])
    }

    pub fn finished_iteration(&self) -> bool {
        self.iter_pos >= self.columns[self.iter_col].write_pos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenizerConfig;

    fn fields(input: &[u8], cfg: TokenizerConfig, num_cols: usize) -> Vec<Vec<Vec<u8>>> {
        let mut t = Tokenizer::new(cfg);
        t.set_source(input);
        t.tokenize(None, false, num_cols).unwrap();
        let mut rows: Vec<Vec<Vec<u8>>> = vec![Vec::new(); t.num_rows()];
        for col in 0..num_cols {
            t.start_iteration(col);
            let mut row = 0;
            while let Some(field) = t.next_field() {
                rows[row].push(field.to_vec());
                row += 1;
            }
        }
        rows
    }

    #[test]
    fn tokenizes_simple_csv() {
        let rows = fields(b"a,b,c\n1,2,3\n", TokenizerConfig::csv(), 3);
        assert_eq!(rows, vec![vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()], vec![b"1".to_vec(), b"2".to_vec(), b"3".to_vec()]]);
    }

    #[test]
    fn empty_field_is_empty_not_absent() {
        let rows = fields(b"1,,3\n", TokenizerConfig::csv(), 3);
        assert_eq!(rows[0][1], Vec::<u8>::new());
    }

    #[test]
    fn quoted_field_preserves_delimiter() {
        let rows = fields(b"\"a,b\",c\n", TokenizerConfig::csv(), 2);
        assert_eq!(rows[0][0], b"a,b".to_vec());
        assert_eq!(rows[0][1], b"c".to_vec());
    }

    #[test]
    fn quoted_field_swallows_embedded_newlines() {
        // A literal newline inside a quoted field doesn't end the row, but
        // it also isn't preserved in the value: QUOTED_FIELD_NEWLINE exists
        // to let a quoted value continue across physical lines, joining the
        // content on either side with nothing in between.
        let rows = fields(b"\"a\nb\",c\n", TokenizerConfig::csv(), 2);
        assert_eq!(rows[0][0], b"ab".to_vec());
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn empty_quoted_field_then_more_fields() {
        let rows = fields(b"\"\",1,2\n", TokenizerConfig::csv(), 3);
        assert_eq!(rows[0][0], Vec::<u8>::new());
        assert_eq!(rows[0][1], b"1".to_vec());
        assert_eq!(rows[0][2], b"2".to_vec());
    }

    #[test]
    fn comment_line_is_skipped() {
        let rows = fields(b"# nope\n1,2\n", TokenizerConfig::csv(), 2);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], b"1".to_vec());
    }

    #[test]
    fn comment_after_leading_whitespace_in_unstripped_field() {
        // strip_whitespace_lines is off, so the comment check inside FIELD
        // (col == 0 and nothing but whitespace seen yet) is what catches it.
        let mut cfg = TokenizerConfig::csv();
        cfg.strip_whitespace_lines = false;
        let rows = fields(b"   # nope\n1,2\n", cfg, 2);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], b"1".to_vec());
    }

    #[test]
    fn too_many_cols_is_an_error() {
        let mut t = Tokenizer::new(TokenizerConfig::csv());
        t.set_source(b"1,2,3\n");
        let err = t.tokenize(None, false, 2).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TooManyCols);
    }

    #[test]
    fn not_enough_cols_is_an_error_unless_filling() {
        let mut t = Tokenizer::new(TokenizerConfig::csv());
        t.set_source(b"1,2\n");
        let err = t.tokenize(None, false, 3).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotEnoughCols);

        let mut cfg = TokenizerConfig::csv();
        cfg.fill_extra_cols = true;
        let rows = fields(b"1,2\n", cfg, 3);
        assert_eq!(rows[0][2], Vec::<u8>::new());
    }

    #[test]
    fn crlf_is_one_line_terminator() {
        let rows = fields(b"1,2\r\n3,4\r\n", TokenizerConfig::csv(), 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], b"3".to_vec());
    }

    #[test]
    fn bare_cr_terminates_a_line() {
        let rows = fields(b"1,2\r3,4\r", TokenizerConfig::csv(), 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], b"4".to_vec());
    }

    #[test]
    fn whitespace_delimited_trailing_spaces_collapse() {
        let rows = fields(b"1 2 3   \n", TokenizerConfig::whitespace_delimited(), 3);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], vec![b"1".to_vec(), b"2".to_vec(), b"3".to_vec()]);
    }

    #[test]
    fn trailing_whitespace_before_newline_with_non_whitespace_delimiter() {
        let mut cfg = TokenizerConfig::csv();
        cfg.strip_whitespace_lines = false;
        cfg.strip_whitespace_fields = true;
        let rows = fields(b"1,2, \n", cfg, 3);
        assert_eq!(rows[0], vec![b"1".to_vec(), b"2".to_vec(), Vec::<u8>::new()]);
    }

    #[test]
    fn header_mode_captures_whole_line_including_delimiters() {
        let mut t = Tokenizer::new(TokenizerConfig::csv());
        t.set_source(b"a,b,c\n1,2,3\n");
        t.tokenize(None, true, 1).unwrap();
        t.start_iteration(0);
        let header = t.next_field().unwrap().to_vec();
        assert_eq!(header, b"a,b,c".to_vec());
        assert_eq!(t.next_field(), None);
        // Cursor is positioned right after the header line for a follow-up
        // data tokenize call.
        assert_eq!(t.num_rows(), 0);
    }

    #[test]
    fn row_limit_stops_after_end_rows() {
        let mut t = Tokenizer::new(TokenizerConfig::csv());
        t.set_source(b"1\n2\n3\n");
        t.tokenize(Some(2), false, 1).unwrap();
        assert_eq!(t.num_rows(), 2);
    }

    #[test]
    fn end_zero_tokenizes_nothing() {
        let mut t = Tokenizer::new(TokenizerConfig::csv());
        t.set_source(b"1,2\n");
        t.tokenize(Some(0), false, 2).unwrap();
        assert_eq!(t.num_rows(), 0);
    }
}
