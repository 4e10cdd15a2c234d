//! Server-rendered HTML pages.
//!
//! No template engine: pages are small enough to build with `format!`.
//! Post titles are escaped; post bodies are emitted raw so stored markup
//! renders (the original application behaved the same way).

use jot_posts::Post;

/// Escapes text for safe interpolation into HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(body: &str) -> String {
    format!(
        "<!doctype html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>jot</title>\n\
         </head>\n\
         <body>\n\
         <div class=\"page\">\n\
         <h1>jot</h1>\n\
         {body}\
         </div>\n\
         </body>\n\
         </html>\n"
    )
}

fn nav(logged_in: bool) -> &'static str {
    if logged_in {
        "<div class=\"metanav\"><a href=\"/logout\">log out</a></div>\n"
    } else {
        "<div class=\"metanav\"><a href=\"/login\">log in</a></div>\n"
    }
}

fn flashes_block(flashes: &[String]) -> String {
    let mut block = String::new();
    for flash in flashes {
        block.push_str(&format!(
            "<div class=\"flash\">{}</div>\n",
            escape_html(flash)
        ));
    }
    block
}

fn entries_block(posts: &[Post]) -> String {
    if posts.is_empty() {
        return "<ul class=\"entries\">\n\
                <li><em>No entries yet. Add some!</em></li>\n\
                </ul>\n"
            .to_string();
    }

    let mut block = String::from("<ul class=\"entries\">\n");
    for post in posts {
        block.push_str(&format!(
            "<li id=\"post-{}\"><h2>{}</h2>{}</li>\n",
            post.id,
            escape_html(&post.title),
            post.text
        ));
    }
    block.push_str("</ul>\n");
    block
}

const ADD_FORM: &str = "<form action=\"/add\" method=\"post\" class=\"add-entry\">\n\
     <dl>\n\
     <dt>Title:</dt>\n\
     <dd><input type=\"text\" name=\"title\" size=\"30\"></dd>\n\
     <dt>Text:</dt>\n\
     <dd><textarea name=\"text\" rows=\"5\" cols=\"40\"></textarea></dd>\n\
     <dd><input type=\"submit\" value=\"Share\"></dd>\n\
     </dl>\n\
     </form>\n";

const SEARCH_FORM: &str = "<form action=\"/search/\" method=\"get\" class=\"search\">\n\
     <input type=\"text\" name=\"query\" placeholder=\"Search entries\">\n\
     <input type=\"submit\" value=\"Search\">\n\
     </form>\n";

/// Renders the post listing used by both `/` and `/search/`.
pub fn posts_page(posts: &[Post], flashes: &[String], logged_in: bool) -> String {
    let mut body = String::new();
    body.push_str(nav(logged_in));
    body.push_str(&flashes_block(flashes));
    body.push_str(SEARCH_FORM);
    if logged_in {
        body.push_str(ADD_FORM);
    }
    body.push_str(&entries_block(posts));
    layout(&body)
}

/// Renders the login form, optionally with an error message.
pub fn login_page(error: Option<&str>) -> String {
    let mut body = String::from("<h2>Login</h2>\n");
    if let Some(error) = error {
        body.push_str(&format!(
            "<p class=\"error\"><strong>Error:</strong> {}</p>\n",
            escape_html(error)
        ));
    }
    body.push_str(
        "<form action=\"/login\" method=\"post\">\n\
         <dl>\n\
         <dt>Username:</dt>\n\
         <dd><input type=\"text\" name=\"username\"></dd>\n\
         <dt>Password:</dt>\n\
         <dd><input type=\"password\" name=\"password\"></dd>\n\
         <dd><input type=\"submit\" value=\"Login\"></dd>\n\
         </dl>\n\
         </form>\n",
    );
    layout(&body)
}
