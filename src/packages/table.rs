//! Static per-backend command metadata

use std::collections::HashSet;

use crate::exec::CommandSpec;
use crate::packages::{apt, googet, rpm, Backend};

/// Fixed tokens placed around the package name or source path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgTemplate {
    pub before: &'static [&'static str],
    pub after: &'static [&'static str],
}

impl ArgTemplate {
    const fn new(before: &'static [&'static str], after: &'static [&'static str]) -> Self {
        Self { before, after }
    }
}

/// Command that prints the complete set of installed packages
#[derive(Debug, Clone, Copy)]
pub struct ListInstalled {
    pub binary: &'static str,
    pub args: &'static [&'static str],
    pub parse: fn(&str) -> HashSet<String>,
}

impl ListInstalled {
    pub fn command(&self) -> CommandSpec {
        CommandSpec::new(self.binary).args(self.args.iter().copied())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BackendDescriptor {
    pub backend: Backend,
    pub binary: &'static str,
    pub install: ArgTemplate,
    /// `None` where the installed unit cannot be named from the descriptor
    pub remove: Option<ArgTemplate>,
    pub env: &'static [(&'static str, &'static str)],
    pub list_installed: Option<ListInstalled>,
}

impl BackendDescriptor {
    pub fn supports_removal(&self) -> bool {
        self.remove.is_some()
    }

    pub fn install_command(&self, target: &str) -> CommandSpec {
        self.build(self.install, target)
    }

    pub fn remove_command(&self, target: &str) -> Option<CommandSpec> {
        self.remove.map(|template| self.build(template, target))
    }

    fn build(&self, template: ArgTemplate, target: &str) -> CommandSpec {
        let mut spec = CommandSpec::new(self.binary)
            .args(template.before.iter().copied())
            .arg(target)
            .args(template.after.iter().copied());
        for (key, value) in self.env {
            spec = spec.env(*key, *value);
        }
        spec
    }
}

const DEBIAN_NONINTERACTIVE: &[(&str, &str)] = &[("DEBIAN_FRONTEND", "noninteractive")];

const RPMQUERY: ListInstalled = ListInstalled {
    binary: "/usr/bin/rpmquery",
    args: &[
        "--queryformat",
        "%{NAME} %{ARCH} %{VERSION}-%{RELEASE}\n",
        "-a",
    ],
    parse: rpm::parse_installed,
};

static APT: BackendDescriptor = BackendDescriptor {
    backend: Backend::Apt,
    binary: "/usr/bin/apt-get",
    install: ArgTemplate::new(&["install", "-y"], &[]),
    remove: Some(ArgTemplate::new(&["remove", "-y"], &[])),
    env: DEBIAN_NONINTERACTIVE,
    list_installed: Some(ListInstalled {
        binary: "/usr/bin/dpkg-query",
        args: &[
            "-W",
            "-f",
            "${Package}\t${Architecture}\t${Version}\t${db:Status-Status}\n",
        ],
        parse: apt::parse_installed,
    }),
};

static DEB: BackendDescriptor = BackendDescriptor {
    backend: Backend::Deb,
    binary: "/usr/bin/dpkg",
    install: ArgTemplate::new(&["--install"], &[]),
    remove: None,
    env: DEBIAN_NONINTERACTIVE,
    list_installed: None,
};

static GOOGET: BackendDescriptor = BackendDescriptor {
    backend: Backend::GooGet,
    binary: "googet.exe",
    install: ArgTemplate::new(&["-noconfirm", "install"], &[]),
    remove: Some(ArgTemplate::new(&["-noconfirm", "remove"], &[])),
    env: &[],
    list_installed: Some(ListInstalled {
        binary: "googet.exe",
        args: &["installed"],
        parse: googet::parse_installed,
    }),
};

static MSI: BackendDescriptor = BackendDescriptor {
    backend: Backend::Msi,
    binary: "msiexec.exe",
    install: ArgTemplate::new(&["/i"], &["/qn", "/norestart"]),
    remove: None,
    env: &[],
    list_installed: None,
};

static YUM: BackendDescriptor = BackendDescriptor {
    backend: Backend::Yum,
    binary: "/usr/bin/yum",
    install: ArgTemplate::new(&["install", "--assumeyes"], &[]),
    remove: Some(ArgTemplate::new(&["remove", "--assumeyes"], &[])),
    env: &[],
    list_installed: Some(RPMQUERY),
};

static ZYPPER: BackendDescriptor = BackendDescriptor {
    backend: Backend::Zypper,
    binary: "/usr/bin/zypper",
    install: ArgTemplate::new(
        &[
            "--gpg-auto-import-keys",
            "--non-interactive",
            "install",
            "--auto-agree-with-licenses",
        ],
        &[],
    ),
    remove: Some(ArgTemplate::new(&["--non-interactive", "remove"], &[])),
    env: &[],
    list_installed: Some(RPMQUERY),
};

static RPM: BackendDescriptor = BackendDescriptor {
    backend: Backend::Rpm,
    binary: "/usr/bin/rpm",
    install: ArgTemplate::new(&["--upgrade", "--replacepkgs", "-v"], &[]),
    remove: None,
    env: &[],
    list_installed: None,
};

pub(crate) fn descriptor(backend: Backend) -> &'static BackendDescriptor {
    match backend {
        Backend::Apt => &APT,
        Backend::Deb => &DEB,
        Backend::GooGet => &GOOGET,
        Backend::Msi => &MSI,
        Backend::Yum => &YUM,
        Backend::Zypper => &ZYPPER,
        Backend::Rpm => &RPM,
    }
}
