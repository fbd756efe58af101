use chrono::{DateTime, Utc};
use freeipa_core::{IpaBool, IpaDateTime, IpaInt, IpaString};

ipa_entity! {
    /// A user account (`user_show --all`).
    pub struct User {
        /// Entry DN.
        pub dn: String => "dn",
        /// Login name.
        pub uid: IpaString => "uid",
        /// POSIX user ID.
        pub uid_number: IpaInt => "uidnumber",
        /// Primary POSIX group ID.
        pub gid_number: IpaInt => "gidnumber",
        /// Given name.
        pub first_name: IpaString => "givenname",
        /// Surname.
        pub last_name: IpaString => "sn",
        /// Full name.
        pub full_name: IpaString => "cn",
        /// Display name.
        pub display_name: IpaString => "displayname",
        /// Initials.
        pub initials: IpaString => "initials",
        /// Home directory.
        pub home_directory: IpaString => "homedirectory",
        /// Login shell.
        pub login_shell: IpaString => "loginshell",
        /// E-mail addresses.
        pub email: Vec<String> => "mail",
        /// Telephone numbers.
        pub telephone_numbers: Vec<String> => "telephonenumber",
        /// Mobile numbers.
        pub mobile_numbers: Vec<String> => "mobile",
        /// Job title.
        pub title: IpaString => "title",
        /// Organisational unit.
        pub org_unit: IpaString => "ou",
        /// Kerberos principal names.
        pub principals: Vec<String> => "krbprincipalname",
        /// Time of the last password change.
        pub last_password_change: IpaDateTime => "krblastpwdchange",
        /// Password expiry time.
        pub password_expiration: IpaDateTime => "krbpasswordexpiration",
        /// SSH public keys.
        pub ssh_public_keys: Vec<String> => "ipasshpubkey",
        /// Whether the account is disabled.
        pub locked: IpaBool => "nsaccountlock",
        /// Whether a password is set.
        pub has_password: IpaBool => "has_password",
        /// Whether a keytab exists.
        pub has_keytab: IpaBool => "has_keytab",
        /// FreeIPA unique identifier.
        pub unique_id: IpaString => "ipauniqueid",
        /// Groups the user is a direct member of.
        pub groups: Vec<String> => "memberof_group",
    }
}

impl User {
    /// True if the password expiry lies before `now`. Users without an expiry never expire.
    #[must_use]
    pub fn password_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.password_expiration
            .value()
            .is_some_and(|expiry| expiry <= now)
    }

    /// True if the user is a direct member of `group`.
    #[must_use]
    pub fn is_member_of(&self, group: &str) -> bool {
        self.groups.iter().any(|name| name == group)
    }
}
