use zbus::fdo;

#[zbus::proxy(
    interface = "org.fcitx.Fcitx.InputMethod",
    default_service = "org.fcitx.Fcitx.CommitString",
    default_path = "/CommitString"
)]
pub trait CommitString {
    fn commit_string(&self, im: &str) -> fdo::Result<()>;
}
