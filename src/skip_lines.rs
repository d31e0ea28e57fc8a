//! Advances a [`Cursor`] past a requested number of *significant* lines.
//!
//! Used by callers to position the cursor just past a header or a block of
//! pre-data noise before handing the tokenizer its real work. A line is
//! significant if it contains at least one byte that survives stripping; in
//! header mode every byte counts, since a header made entirely of whitespace
//! is still a header.

use log::trace;

use crate::cursor::Cursor;
use crate::errors::TokenizeErrorKind;

pub(crate) fn skip_lines(
    cursor: &mut Cursor,
    comment: u8,
    strip_whitespace_lines: bool,
    offset: usize,
    header: bool,
) -> Result<(), TokenizeErrorKind> {
    let mut signif_chars = 0usize;
    let mut in_comment_line = false;
    let mut skipped = 0usize;

    while skipped < offset {
        if cursor.pos() >= cursor.len() {
            trace!("skip_lines ran out of input after {} of {} lines", skipped, offset);
            return if header {
                Err(TokenizeErrorKind::InvalidLine)
            } else {
                Ok(())
            };
        }

        let c = cursor.current();

        if c == b'\r' || c == b'\n' {
            if c == b'\r' && cursor.peek_next() == Some(b'\n') {
                cursor.advance(); // skip the \n half of \r\n
            }
            if !in_comment_line && signif_chars > 0 {
                skipped += 1;
            }
            signif_chars = 0;
            in_comment_line = false;
        } else if !matches!(c, b' ' | b'\t') || !strip_whitespace_lines || header {
            if signif_chars == 0 && comment != 0 && c == comment {
                in_comment_line = true;
            }
            signif_chars += 1;
        }

        cursor.advance();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skip(input: &[u8], offset: usize, header: bool) -> (Result<(), TokenizeErrorKind>, usize) {
        let mut cursor = Cursor::new(input);
        let res = skip_lines(&mut cursor, b'#', true, offset, header);
        (res, cursor.pos())
    }

    #[test]
    fn skips_requested_number_of_lines() {
        let (res, pos) = skip(b"a\nb\nc\n", 2, false);
        assert_eq!(res, Ok(()));
        assert_eq!(pos, 4); // past "a\nb\n"
    }

    #[test]
    fn skips_comment_and_blank_lines_without_counting_in_data_mode() {
        let (res, pos) = skip(b"# hi\n\na,b,c\n", 1, false);
        assert_eq!(res, Ok(()));
        assert_eq!(pos, 12); // past the header line
    }

    #[test]
    fn header_mode_counts_whitespace_only_lines() {
        let (res, pos) = skip(b"   \nreal header\n", 1, true);
        assert_eq!(res, Ok(()));
        assert_eq!(pos, 4);
    }

    #[test]
    fn header_mode_errors_when_input_runs_out() {
        let (res, _) = skip(b"only one line\n", 5, true);
        assert_eq!(res, Err(TokenizeErrorKind::InvalidLine));
    }

    #[test]
    fn data_mode_succeeds_with_no_data_when_input_runs_out() {
        let (res, _) = skip(b"only one line\n", 5, false);
        assert_eq!(res, Ok(()));
    }

    #[test]
    fn crlf_counts_as_a_single_terminator() {
        let (res, pos) = skip(b"a\r\nb\r\nc\r\n", 2, false);
        assert_eq!(res, Ok(()));
        assert_eq!(pos, 6); // past "a\r\nb\r\n"
    }

    #[test]
    fn lone_cr_terminates_a_line() {
        let (res, pos) = skip(b"a\rb\rc\r", 2, false);
        assert_eq!(res, Ok(()));
        assert_eq!(pos, 4);
    }
}
