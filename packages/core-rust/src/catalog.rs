//! Built-in mandatory class documents.
//!
//! Each target is assembled from per-concern field groups ([`rights_fields`],
//! [`comment_fields`], ...) so related classes share declarations by
//! concatenation. [`builtin`] lists every target in bootstrap order.

use crate::error::SchemaError;
use crate::field::NumberType;
use crate::schema::{FieldSpec, SchemaTarget};
use crate::types::LocalReference;

/// Space holding every built-in class document.
pub const SYSTEM_SPACE: &str = "XWiki";

fn system(page: &str) -> LocalReference {
    LocalReference::new(SYSTEM_SPACE, page)
}

/// Fields shared by page-level and wiki-level rights classes.
#[must_use]
pub fn rights_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::groups("groups", "Groups"),
        FieldSpec::levels("levels", "Levels"),
        FieldSpec::users("users", "Users", true),
        FieldSpec::boolean("allow", "Allow/Deny", "allow").with_boolean_default(true),
    ]
}

/// Fields of a comment object.
#[must_use]
pub fn comment_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("author", "Author", 30),
        FieldSpec::text_area("highlight", "Highlighted Text", 40, 2),
        FieldSpec::number("replyto", "Reply To", 5, NumberType::Integer),
        FieldSpec::text("date", "Date", 20),
        FieldSpec::text_area("comment", "Comment", 40, 5),
    ]
}

/// Profile fields of a user.
#[must_use]
pub fn profile_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("first_name", "First Name", 30),
        FieldSpec::text("last_name", "Last Name", 30),
        FieldSpec::email("email", "e-Mail", 30),
        FieldSpec::text("company", "Company", 30),
        FieldSpec::text("blog", "Blog", 60),
        FieldSpec::text("blogfeed", "Blog Feed", 60),
        FieldSpec::text_area("comment", "Comment", 40, 5),
        FieldSpec::static_list("imtype", "IM Type", "---|AIM|Yahoo|Jabber|MSN|Skype|ICQ"),
        FieldSpec::text("imaccount", "imaccount", 30),
        FieldSpec::text("avatar", "Avatar", 30),
    ]
}

/// Per-user display preferences.
#[must_use]
pub fn user_preference_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("default_language", "Default Language", 30),
        FieldSpec::static_list("editor", "Default Editor", "---|Text|Wysiwyg"),
        FieldSpec::text("skin", "skin", 30),
        FieldSpec::static_list("pageWidth", "Preferred page width", "default|640|800|1024|1280|1600"),
        FieldSpec::timezone("timezone", "Time Zone"),
    ]
}

/// `XWiki.XWikiUsers`.
///
/// # Errors
///
/// Propagates [`SchemaError`] from the declaration.
pub fn users() -> Result<SchemaTarget, SchemaError> {
    SchemaTarget::builder("XWiki.XWikiUsers")
        .fields(profile_fields())
        .field(FieldSpec::password("password", "Password", 10))
        .field(FieldSpec::password("validkey", "Validation Key", 10))
        .field(FieldSpec::boolean("active", "Active", "active"))
        .fields(user_preference_fields())
        .hidden(true)
        .sheet(system("XWikiUserSheet"))
        .obsolete_sheet(system("XWikiUserClassSheet"))
        .content("1 XWiki Users")
        .title("XWiki User Class")
        .build()
}

/// `XWiki.XWikiPreferences`, stored with the `internal` custom mapping.
///
/// # Errors
///
/// Propagates [`SchemaError`] from the declaration.
pub fn preferences() -> Result<SchemaTarget, SchemaError> {
    let yes_no = |name: &str, label: &str| FieldSpec::boolean(name, label, "yesno");
    let image_or_text = |name: &str, label: &str| FieldSpec::static_list(name, label, "---|Image|Text");

    SchemaTarget::builder("XWiki.XWikiPreferences")
        .field(yes_no("multilingual", "Multi-Lingual"))
        .field(FieldSpec::text("language", "Language", 5))
        .field(FieldSpec::text("default_language", "Default Language", 5))
        .field(yes_no("authenticate_edit", "Authenticated Edit"))
        .field(yes_no("authenticate_view", "Authenticated View"))
        .field(yes_no("auth_active_check", "Authentication Active Check"))
        .field(yes_no("backlinks", "Backlinks"))
        .field(FieldSpec::text("skin", "Skin", 30))
        .remove_field("baseskin")
        .field(FieldSpec::text("stylesheet", "Default Stylesheet", 30))
        .field(FieldSpec::text("stylesheets", "Alternative Stylesheet", 60))
        .field(FieldSpec::static_list("editor", "Default Editor", "---|Text|Wysiwyg"))
        .field(FieldSpec::text("webcopyright", "Copyright", 30))
        .field(FieldSpec::text("title", "Title", 30))
        .field(FieldSpec::text("version", "Version", 30))
        .field(FieldSpec::text_area("meta", "HTTP Meta Info", 60, 8))
        .field(yes_no("use_email_verification", "Use eMail Verification"))
        .field(FieldSpec::text("smtp_server", "SMTP Server", 30))
        .field(FieldSpec::email("admin_email", "Admin eMail", 30))
        .field(FieldSpec::text_area("validation_email_content", "Validation eMail Content", 72, 10))
        .field(FieldSpec::text_area("confirmation_email_content", "Confirmation eMail Content", 72, 10))
        .field(FieldSpec::text_area("invitation_email_content", "Invitation eMail Content", 72, 10))
        .field(image_or_text("registration_anonymous", "Anonymous"))
        .field(image_or_text("registration_registered", "Registered"))
        .field(image_or_text("edit_anonymous", "Anonymous"))
        .field(image_or_text("edit_registered", "Registered"))
        .field(image_or_text("comment_anonymous", "Anonymous"))
        .field(image_or_text("comment_registered", "Registered"))
        .field(yes_no("tags", "Activate the tagging"))
        .field(FieldSpec::text("leftPanels", "Panels displayed on the left", 60))
        .field(FieldSpec::text("rightPanels", "Panels displayed on the right", 60))
        .field(yes_no("showLeftPanels", "Display the left panel column"))
        .field(yes_no("showRightPanels", "Display the right panel column"))
        .field(FieldSpec::static_list("pageWidth", "Preferred page width", "default|640|800|1024|1280|1600"))
        .field(FieldSpec::text("languages", "Supported languages", 30))
        .field(FieldSpec::text("documentBundles", "Internationalization Document Bundles", 60))
        .field(FieldSpec::timezone("timezone", "Time Zone"))
        .custom_mapping("internal")
        .hidden(true)
        .content("1 XWiki Preferences")
        .build()
}

/// `XWiki.XWikiGroups`.
///
/// # Errors
///
/// Propagates [`SchemaError`] from the declaration.
pub fn groups() -> Result<SchemaTarget, SchemaError> {
    SchemaTarget::builder("XWiki.XWikiGroups")
        .field(FieldSpec::text("member", "Member", 30))
        .hidden(true)
        .sheet(system("XWikiGroupSheet"))
        .content("1 XWiki Groups")
        .build()
}

/// `XWiki.XWikiRights`, page-level rights.
///
/// # Errors
///
/// Propagates [`SchemaError`] from the declaration.
pub fn rights() -> Result<SchemaTarget, SchemaError> {
    SchemaTarget::builder("XWiki.XWikiRights")
        .fields(rights_fields())
        .hidden(true)
        .content("1 XWiki XWikiRights Class")
        .build()
}

/// `XWiki.XWikiGlobalRights`; only the main wiki carries farm-wide rights.
///
/// # Errors
///
/// Propagates [`SchemaError`] from the declaration.
pub fn global_rights() -> Result<SchemaTarget, SchemaError> {
    SchemaTarget::builder("XWiki.XWikiGlobalRights")
        .fields(rights_fields())
        .hidden(true)
        .main_wiki_only()
        .content("1 XWiki XWikiGlobalRights Class")
        .build()
}

/// `XWiki.XWikiComments`.
///
/// # Errors
///
/// Propagates [`SchemaError`] from the declaration.
pub fn comments() -> Result<SchemaTarget, SchemaError> {
    SchemaTarget::builder("XWiki.XWikiComments")
        .fields(comment_fields())
        .hidden(true)
        .content("1 XWiki Comment Class")
        .build()
}

/// `XWiki.XWikiSkins`: skin name plus overridable templates.
///
/// # Errors
///
/// Propagates [`SchemaError`] from the declaration.
pub fn skins() -> Result<SchemaTarget, SchemaError> {
    let templates = ["style.css", "header.vm", "footer.vm", "viewheader.vm", "view.vm", "edit.vm"];
    let labels = ["Style", "Header", "Footer", "View Header", "View", "Edit"];

    SchemaTarget::builder("XWiki.XWikiSkins")
        .field(FieldSpec::text("name", "Name", 30))
        .field(FieldSpec::text("baseskin", "Base Skin", 30))
        .fields(
            templates
                .iter()
                .zip(labels)
                .map(|(name, label)| FieldSpec::template(*name, label)),
        )
        .content("1 XWiki Skin Class")
        .build()
}

/// `XWiki.TagClass`: tags are stored relationally, one row per tag.
///
/// # Errors
///
/// Propagates [`SchemaError`] from the declaration.
pub fn tags() -> Result<SchemaTarget, SchemaError> {
    SchemaTarget::builder("XWiki.TagClass")
        .field(FieldSpec::static_list("tags", "Tags", "").with_list(|list| {
            list.size = 30;
            list.multi_select = true;
            list.relational_storage = true;
            list.display_type = "checkbox".to_string();
        }))
        .hidden(true)
        .content("1 XWiki TagClass")
        .build()
}

/// Every built-in class document, in bootstrap order.
///
/// # Errors
///
/// Returns the first [`SchemaError`] among the declarations.
pub fn builtin() -> Result<Vec<(LocalReference, SchemaTarget)>, SchemaError> {
    Ok(vec![
        (system("XWikiPreferences"), preferences()?),
        (system("XWikiUsers"), users()?),
        (system("XWikiGroups"), groups()?),
        (system("XWikiRights"), rights()?),
        (system("XWikiGlobalRights"), global_rights()?),
        (system("XWikiComments"), comments()?),
        (system("XWikiSkins"), skins()?),
        (system("TagClass"), tags()?),
    ])
}
