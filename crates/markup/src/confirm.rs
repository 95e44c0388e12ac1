use formloom_application::ConfirmModel;

use crate::escape::escape_html;

/// Renders the delete confirmation page.
#[must_use]
pub fn render_confirm_delete(confirm: &ConfirmModel) -> String {
    format!(
        "<form method=\"post\" action=\"{destroy}\">\n\
         <p>Are you sure you want to remove this?</p>\n\
         <input type=\"submit\" class=\"btn btn-danger\" value=\"Yes\">\n\
         <a href=\"{back}\" class=\"btn btn-primary\">No</a>\n\
         </form>\n",
        destroy = escape_html(&confirm.destroy_url),
        back = escape_html(&confirm.back_url),
    )
}
