mod common;

use sm_tui::app::{App, Mode};

use common::{make_response, render_to_string};

#[test]
fn credentials_shown_after_create() {
    let mut app = App::new();
    app.mode = Mode::Credentials(Box::new(make_response("blog.example.com")));
    let output = render_to_string(&app, 80, 40);
    assert!(!output.contains("root-secret"));
    insta::assert_snapshot!(output);
}
