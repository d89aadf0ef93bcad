use std::fmt;

/// Camera start-up failure, classified by the platform error name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    PermissionDenied,
    NoCamera,
    Unsupported,
    InUse,
    ConstraintsUnsatisfiable,
    Unknown(String),
}

const DEFAULT_REMEDIATION: &[&str] = &[
    "Make sure the browser has been granted access to the camera",
    "Check that the camera is not being used by another application",
    "Try reloading the page or restarting the browser",
    "In production, make sure the site is served over HTTPS",
];

impl CameraError {
    /// Map a platform error name (`NotAllowedError`, ...) to a failure class.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "NotAllowedError" => CameraError::PermissionDenied,
            "NotFoundError" => CameraError::NoCamera,
            "NotSupportedError" => CameraError::Unsupported,
            "NotReadableError" => CameraError::InUse,
            "OverconstrainedError" => CameraError::ConstraintsUnsatisfiable,
            other => CameraError::Unknown(other.to_string()),
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            CameraError::PermissionDenied => "Camera permission was denied",
            CameraError::NoCamera => "No camera is available on this device",
            CameraError::Unsupported => {
                "This browser does not support camera access"
            }
            CameraError::InUse => "The camera is in use by another application",
            CameraError::ConstraintsUnsatisfiable => {
                "The requested camera settings are not available"
            }
            CameraError::Unknown(_) => {
                "An error occurred while starting the camera"
            }
        }
    }

    /// Steps shown to the user under the failure message.
    pub fn remediation(&self) -> &'static [&'static str] {
        match self {
            CameraError::PermissionDenied => &[
                "Click the camera icon in the address bar and allow access",
                "In Chrome: Settings > Privacy and security > Site settings > Camera",
                "In Firefox: click the lock icon next to the address and allow the camera",
                "Reload the page after changing the setting",
            ],
            CameraError::NoCamera => &[
                "Connect an external webcam",
                "Check that the camera works in other applications",
                "Restart the browser or the device",
            ],
            CameraError::Unsupported => &[
                "Use a modern browser such as Chrome, Firefox or Edge",
                "Update the browser to the latest version",
                "In production, make sure the site is served over HTTPS",
            ],
            CameraError::InUse => &[
                "Close other applications that use the camera",
                "Close other browser tabs that use the camera",
                "Restart the browser",
            ],
            CameraError::ConstraintsUnsatisfiable => &[
                "Try a different camera",
                "Restart the application",
            ],
            CameraError::Unknown(_) => DEFAULT_REMEDIATION,
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::Unknown(name) if !name.is_empty() => {
                write!(f, "{} ({name})", self.message())
            }
            _ => f.write_str(self.message()),
        }
    }
}

impl std::error::Error for CameraError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_map_to_their_class() {
        assert_eq!(
            CameraError::from_name("NotAllowedError"),
            CameraError::PermissionDenied
        );
        assert_eq!(CameraError::from_name("NotFoundError"), CameraError::NoCamera);
        assert_eq!(
            CameraError::from_name("NotSupportedError"),
            CameraError::Unsupported
        );
        assert_eq!(CameraError::from_name("NotReadableError"), CameraError::InUse);
        assert_eq!(
            CameraError::from_name("OverconstrainedError"),
            CameraError::ConstraintsUnsatisfiable
        );
    }

    #[test]
    fn every_class_has_distinct_message() {
        let classes = [
            CameraError::PermissionDenied,
            CameraError::NoCamera,
            CameraError::Unsupported,
            CameraError::InUse,
            CameraError::ConstraintsUnsatisfiable,
            CameraError::Unknown("AbortError".into()),
        ];
        let mut messages: Vec<_> = classes.iter().map(|c| c.message()).collect();
        messages.sort_unstable();
        messages.dedup();
        assert_eq!(messages.len(), classes.len());
        assert!(classes.iter().all(|c| !c.remediation().is_empty()));
    }

    #[test]
    fn unknown_names_get_default_checklist() {
        let error = CameraError::from_name("SecurityError");
        assert_eq!(error, CameraError::Unknown("SecurityError".into()));
        assert_eq!(error.remediation(), DEFAULT_REMEDIATION);
        assert_eq!(
            error.to_string(),
            "An error occurred while starting the camera (SecurityError)"
        );
    }
}
