use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::domain::SessionState;

pub const PAGE_TITLE: &str = "MK Chatbot";

/// Render the whole chat page for one session.
///
/// The input's `id` is derived from the session's input key, so every
/// successful send produces a fresh, empty input.
pub fn render_page(state: &SessionState) -> String {
    let mut body = String::new();

    body.push_str("<h3>Chatbot conversation:</h3>\n");
    for line in state.display_lines() {
        body.push_str(&format!(
            "<p class=\"turn\" style=\"font-size:14px;\">{}</p>\n",
            encode_text(&line)
        ));
    }

    if let Some(banner) = state.error_banner() {
        body.push_str(&format!(
            "<div class=\"error\" role=\"alert\">{}</div>\n",
            encode_text(banner)
        ));
    }

    let key = state.input_key();
    let input_id = format!("user_input_{key}");
    let input_id = encode_double_quoted_attribute(&input_id);
    body.push_str(&format!(
        "<form method=\"post\" action=\"/send\">\n\
         <label for=\"{input_id}\">You: </label>\n\
         <input type=\"text\" id=\"{input_id}\" name=\"prompt\" value=\"\" autocomplete=\"off\" autofocus>\n\
         <input type=\"hidden\" name=\"input_key\" value=\"{key}\">\n\
         <button type=\"submit\">Send</button>\n\
         </form>\n"
    ));

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{PAGE_TITLE}</title>\n\
         <style>body{{max-width:46rem;margin:2rem auto;font-family:sans-serif}}\
         .error{{background:#fde8e8;color:#9b1c1c;padding:.75rem;border-radius:.25rem;margin:.5rem 0}}\
         input[type=text]{{width:70%}}</style>\n\
         </head>\n<body>\n{body}</body>\n</html>\n"
    )
}
