//! Wire-level names and the static introspection data for the commit object.

/// The object path the commit service is bound to
pub const OBJECT_PATH: &str = "/CommitString";

/// The input-method interface exposing [`COMMIT_METHOD`]
pub const INTERFACE_NAME: &str = "org.fcitx.Fcitx.InputMethod";

/// The method that injects a string into the current input context
pub const COMMIT_METHOD: &str = "CommitString";

/// The name of the single string argument of [`COMMIT_METHOD`]
pub const COMMIT_ARG: &str = "im";

/// The standard interface every object answers [`INTROSPECT_METHOD`] on
pub const INTROSPECTABLE_INTERFACE: &str = "org.freedesktop.DBus.Introspectable";
/// Returns [`INTROSPECTION_XML`]
pub const INTROSPECT_METHOD: &str = "Introspect";

/// Sent for calls whose member or arguments match nothing on a bound object
pub const UNKNOWN_METHOD_ERROR: &str = "org.freedesktop.DBus.Error.UnknownMethod";
/// Sent for calls to an object path nothing is bound to
pub const UNKNOWN_OBJECT_ERROR: &str = "org.freedesktop.DBus.Error.UnknownObject";

/// Describes [`OBJECT_PATH`].  Kept byte-for-byte stable; clients may cache
/// it.
pub const INTROSPECTION_XML: &str = concat!(
    "<!DOCTYPE node PUBLIC \"-//freedesktop//DTD D-BUS Object Introspection 1.0//EN\" ",
    "\"http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd\">",
    "<node name=\"/CommitString\">",
    "<interface name=\"org.freedesktop.DBus.Introspectable\">",
    "<method name=\"Introspect\">",
    "<arg name=\"data\" direction=\"out\" type=\"s\"/>",
    "</method>",
    "</interface>",
    "<interface name=\"org.fcitx.Fcitx.InputMethod\">",
    "<method name=\"CommitString\">",
    "<arg name=\"im\" direction=\"in\" type=\"s\"/>",
    "</method>",
    "</interface>",
    "</node>",
);

/// Formats the error message sent back when a commit call carries the wrong
/// arguments
pub fn signature_mismatch(signature: &str) -> String {
    format!("No such method with signature ({signature})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_names_match_constants() {
        assert!(INTROSPECTION_XML.contains(&format!("<node name=\"{OBJECT_PATH}\">")));
        assert!(INTROSPECTION_XML.contains(&format!("<interface name=\"{INTERFACE_NAME}\">")));
        assert!(INTROSPECTION_XML.contains(&format!(
            "<interface name=\"{INTROSPECTABLE_INTERFACE}\">"
        )));
        assert!(INTROSPECTION_XML.contains(&format!("<method name=\"{COMMIT_METHOD}\">")));
        assert!(INTROSPECTION_XML.contains(&format!("<method name=\"{INTROSPECT_METHOD}\">")));
        assert!(INTROSPECTION_XML.contains(&format!(
            "<arg name=\"{COMMIT_ARG}\" direction=\"in\" type=\"s\"/>"
        )));
    }

    #[test]
    fn test_xml_shape() {
        assert!(INTROSPECTION_XML.starts_with("<!DOCTYPE node PUBLIC"));
        assert!(INTROSPECTION_XML.ends_with("</node>"));
        assert_eq!(INTROSPECTION_XML.matches("<interface ").count(), 2);
        assert_eq!(INTROSPECTION_XML.matches("</interface>").count(), 2);
        assert_eq!(INTROSPECTION_XML.matches("<method ").count(), 2);
        assert_eq!(INTROSPECTION_XML.matches("<arg ").count(), 2);
    }

    #[test]
    fn test_signature_mismatch() {
        assert_eq!(
            signature_mismatch("ss"),
            "No such method with signature (ss)"
        );
        assert_eq!(signature_mismatch(""), "No such method with signature ()");
    }
}
