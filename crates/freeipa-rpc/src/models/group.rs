use freeipa_core::{IpaInt, IpaString};

ipa_entity! {
    /// A user group (`group_show --all`).
    pub struct Group {
        /// Entry DN.
        pub dn: String => "dn",
        /// Group name.
        pub gid: IpaString => "cn",
        /// POSIX group ID; zero for non-POSIX groups.
        pub gid_number: IpaInt => "gidnumber",
        /// Free-form description.
        pub description: IpaString => "description",
        /// FreeIPA unique identifier.
        pub unique_id: IpaString => "ipauniqueid",
        /// Object classes of the entry.
        pub object_classes: Vec<String> => "objectclass",
        /// Direct user members.
        pub member_users: Vec<String> => "member_user",
        /// Direct group members.
        pub member_groups: Vec<String> => "member_group",
        /// Groups this group is a member of.
        pub member_of_groups: Vec<String> => "memberof_group",
        /// Users that are members through nested groups.
        pub indirect_member_users: Vec<String> => "memberindirect_user",
    }
}

impl Group {
    /// True if `uid` is a direct or indirect member.
    #[must_use]
    pub fn has_member(&self, uid: &str) -> bool {
        self.member_users
            .iter()
            .chain(&self.indirect_member_users)
            .any(|member| member == uid)
    }

    /// True if the group carries the `posixgroup` object class.
    #[must_use]
    pub fn is_posix(&self) -> bool {
        self.object_classes
            .iter()
            .any(|class| class.eq_ignore_ascii_case("posixgroup"))
    }
}
