/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The member-access disambiguator (spec.md §4.7): classifies
//! `LHS.name = ...` assignments inside a method body as class-member or
//! instance-member, using only the naming conventions and decorator
//! names available at bind time (no type information).

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberAccessKind {
    ClassMember,
    InstanceMember,
}

const CLASS_MEMBER_ONLY_METHODS: &[&str] = &["__new__", "__init_subclass__", "__class_getitem__"];

/// `lhs_name` is the name on the left of the dotted assignment (e.g. `x`
/// in `x.name = ...`); `first_param` is the method's first parameter
/// name (`self`/`cls`/whatever the author chose); `decorators` are the
/// plain (undotted) decorator names applied to the enclosing method.
pub fn classify(
    lhs_name: &str,
    class_name: &str,
    method_name: &str,
    first_param: Option<&str>,
    decorators: &[&str],
) -> Option<MemberAccessKind> {
    if lhs_name == class_name {
        return Some(MemberAccessKind::ClassMember);
    }
    if first_param == Some(lhs_name) && CLASS_MEMBER_ONLY_METHODS.contains(&method_name) {
        return Some(MemberAccessKind::ClassMember);
    }
    if decorators.contains(&"staticmethod") {
        return None;
    }
    if decorators.contains(&"classmethod") {
        return Some(MemberAccessKind::ClassMember);
    }
    Some(MemberAccessKind::InstanceMember)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name_match_is_class_member() {
        assert_eq!(
            classify("C", "C", "m", Some("self"), &[]),
            Some(MemberAccessKind::ClassMember)
        );
    }

    #[test]
    fn test_new_with_cls_param_is_class_member() {
        assert_eq!(
            classify("cls", "C", "__new__", Some("cls"), &[]),
            Some(MemberAccessKind::ClassMember)
        );
    }

    #[test]
    fn test_staticmethod_bails_out() {
        assert_eq!(classify("self", "C", "m", Some("self"), &["staticmethod"]), None);
    }

    #[test]
    fn test_classmethod_decorator_is_class_member() {
        assert_eq!(
            classify("cls", "C", "m", Some("cls"), &["classmethod"]),
            Some(MemberAccessKind::ClassMember)
        );
    }

    #[test]
    fn test_default_is_instance_member() {
        assert_eq!(
            classify("self", "C", "m", Some("self"), &[]),
            Some(MemberAccessKind::InstanceMember)
        );
    }
}
