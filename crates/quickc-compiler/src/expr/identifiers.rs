//! Name resolution for identifiers and member accesses.
//!
//! A simple name is looked up as, in order: a local, a field of the current
//! class, a method of the current class, a class, a namespace, and finally a
//! keyword type (`int.MaxValue`). A member access resolves its object first
//! and then looks the member up on whatever that turned out to be.

use quickc_core::{CompilationError, DataType, Span, Value, Visibility};
use quickc_modules::NativeClass;
use quickc_parser::ast::{Expr, Ident, MemberExpr};

use super::{ExprCompiler, Result};
use crate::bytecode::{OpCode, eval};
use crate::context::{ClassRef, FieldSymbol};
use crate::expr_info::ExprInfo;

/// A field reached by name.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FieldRef {
    pub class: usize,
    pub slot: u16,
    pub ty: DataType,
    pub is_static: bool,
    pub is_readonly: bool,
    pub name: String,
}

impl FieldRef {
    fn new(class: usize, field: &FieldSymbol<'_>) -> Self {
        Self {
            class,
            slot: field.slot,
            ty: field.ty,
            is_static: field.is_static,
            is_readonly: field.is_readonly,
            name: field.name.clone(),
        }
    }
}

/// Where the overloads of a method group live.
#[derive(Debug, Clone)]
pub(crate) enum CallTarget<'a> {
    /// Methods of a script class. `implicit_this` is set when the group was
    /// named without a class qualifier, so instance methods are callable.
    Script { class: usize, implicit_this: bool },
    NativeStatic(&'a NativeClass),
    /// Instance methods of a keyword type, on a receiver already emitted.
    NativeInstance {
        class: &'a NativeClass,
        receiver: ExprInfo,
    },
    /// `x.ToString()` on any value.
    ToString(ExprInfo),
}

/// What a name turned out to denote.
#[derive(Debug, Clone)]
pub(crate) enum Resolved<'a> {
    Local { slot: u16, ty: DataType },
    Field(FieldRef),
    Constant(Value),
    MethodGroup { target: CallTarget<'a>, name: String },
    Class(ClassRef<'a>),
    Namespace(String),
    /// A value already on the stack.
    Value(ExprInfo),
    This,
}

impl<'a> ExprCompiler<'a, '_, '_> {
    pub(super) fn resolve(&mut self, expr: &Expr<'_>) -> Result<Resolved<'a>> {
        match expr {
            Expr::Ident(ident) => self.resolve_ident(ident),
            Expr::Member(member) => {
                self.enter(member.span)?;
                let resolved = self.resolve_member(member);
                self.depth -= 1;
                resolved
            }
            Expr::This(span) => {
                if self.method.is_static {
                    Err(CompilationError::InstanceMemberFromStatic {
                        member: "this".to_string(),
                        span: *span,
                    })
                } else {
                    Ok(Resolved::This)
                }
            }
            other => self.compile(other).map(Resolved::Value),
        }
    }

    fn resolve_ident(&mut self, ident: &Ident<'_>) -> Result<Resolved<'a>> {
        let ctx = self.ctx;
        let name = ident.name;

        if let Some(local) = self.locals.lookup(name) {
            return Ok(Resolved::Local {
                slot: local.slot,
                ty: local.data_type,
            });
        }

        let current = self.method.class;
        let class = ctx.class(current);
        if let Some(field) = class.field(name) {
            if !field.is_static && self.method.is_static {
                return Err(CompilationError::InstanceMemberFromStatic {
                    member: format!("{}.{name}", class.name),
                    span: ident.span,
                });
            }
            return Ok(Resolved::Field(FieldRef::new(current, field)));
        }
        if class.methods_named(name).next().is_some() {
            return Ok(Resolved::MethodGroup {
                target: CallTarget::Script {
                    class: current,
                    implicit_this: true,
                },
                name: name.to_string(),
            });
        }

        if let Some(found) = ctx.lookup_class(current, name) {
            return Ok(Resolved::Class(found));
        }
        if let Some(namespace) = ctx.lookup_namespace(current, name) {
            return Ok(Resolved::Namespace(namespace));
        }
        if let Some(native) = DataType::from_keyword(name)
            .filter(|ty| !ty.is_void())
            .and_then(|ty| ctx.keyword_class(ty))
        {
            return Ok(Resolved::Class(ClassRef::Native(native)));
        }

        Err(CompilationError::UnknownName {
            name: name.to_string(),
            span: ident.span,
        })
    }

    fn resolve_member(&mut self, member: &MemberExpr<'_>) -> Result<Resolved<'a>> {
        let ctx = self.ctx;
        let name = member.member.name;
        let span = member.member.span;

        match self.resolve(member.object)? {
            Resolved::Namespace(namespace) => {
                let full = format!("{namespace}.{name}");
                if let Some(found) = ctx.find_class(&full) {
                    Ok(Resolved::Class(found))
                } else if ctx.is_namespace(&full) {
                    Ok(Resolved::Namespace(full))
                } else {
                    Err(CompilationError::UnknownType { name: full, span })
                }
            }

            Resolved::Class(ClassRef::Script(index)) => {
                let class = ctx.class(index);
                if let Some(field) = class.field(name) {
                    let qualified = format!("{}.{name}", class.name);
                    self.check_access(index, field.visibility, &qualified, span)?;
                    if !field.is_static {
                        return Err(CompilationError::InstanceMemberFromStatic {
                            member: qualified,
                            span,
                        });
                    }
                    return Ok(Resolved::Field(FieldRef::new(index, field)));
                }
                if class.methods_named(name).next().is_some() {
                    return Ok(Resolved::MethodGroup {
                        target: CallTarget::Script {
                            class: index,
                            implicit_this: false,
                        },
                        name: name.to_string(),
                    });
                }
                Err(CompilationError::UnknownMember {
                    type_name: class.name.to_string(),
                    member: name.to_string(),
                    span,
                })
            }

            Resolved::Class(ClassRef::Native(native)) => {
                if let Some(constant) = native.constant(name) {
                    return Ok(Resolved::Constant(constant.value.clone()));
                }
                if native.functions_named(name).next().is_some() {
                    return Ok(Resolved::MethodGroup {
                        target: CallTarget::NativeStatic(native),
                        name: name.to_string(),
                    });
                }
                if native.methods_named(name).next().is_some() {
                    return Err(CompilationError::InstanceMemberFromStatic {
                        member: format!("{}.{name}", native.name),
                        span,
                    });
                }
                Err(CompilationError::UnknownMember {
                    type_name: native.name.to_string(),
                    member: name.to_string(),
                    span,
                })
            }

            Resolved::This => {
                let current = self.method.class;
                let class = ctx.class(current);
                match class.field(name) {
                    Some(field) if !field.is_static => {
                        Ok(Resolved::Field(FieldRef::new(current, field)))
                    }
                    Some(_) => Err(CompilationError::Unsupported {
                        feature: format!("accessing the static field '{name}' through 'this'"),
                        span,
                    }),
                    None if class.methods_named(name).next().is_some() => {
                        Ok(Resolved::MethodGroup {
                            target: CallTarget::Script {
                                class: current,
                                implicit_this: true,
                            },
                            name: name.to_string(),
                        })
                    }
                    None => Err(CompilationError::UnknownMember {
                        type_name: class.name.to_string(),
                        member: name.to_string(),
                        span,
                    }),
                }
            }

            Resolved::MethodGroup { name: group, .. } => {
                Err(CompilationError::MethodGroupAsValue { name: group, span: member.object.span() })
            }

            value => {
                let info = self.materialize(value, member.object.span())?;
                self.value_member(info, name, span)
            }
        }
    }

    /// A member of a value on the stack.
    fn value_member(&mut self, info: ExprInfo, name: &str, span: Span) -> Result<Resolved<'a>> {
        let ctx = self.ctx;
        if info.ty == DataType::String && name == "Length" {
            if let Some(value) = &info.constant {
                let length = eval::unary(OpCode::StrLen, value, true)
                    .map_err(|e| super::fold_error(e, span))?;
                return Ok(Resolved::Value(self.replace_with_constant(info.start, length)));
            }
            self.emitter.emit(OpCode::StrLen);
            return Ok(Resolved::Value(ExprInfo::rvalue(DataType::Int, info.start)));
        }
        if name == "ToString" && !info.ty.is_void() {
            return Ok(Resolved::MethodGroup {
                target: CallTarget::ToString(info),
                name: name.to_string(),
            });
        }
        if let Some(class) = ctx
            .keyword_class(info.ty)
            .filter(|class| class.methods_named(name).next().is_some())
        {
            return Ok(Resolved::MethodGroup {
                target: CallTarget::NativeInstance {
                    class,
                    receiver: info,
                },
                name: name.to_string(),
            });
        }
        Err(CompilationError::UnknownMember {
            type_name: info.ty.name().to_string(),
            member: name.to_string(),
            span,
        })
    }

    /// Private and protected members are only reachable from their own class.
    pub(super) fn check_access(
        &self,
        owner: usize,
        visibility: Visibility,
        name: &str,
        span: Span,
    ) -> Result<()> {
        if owner != self.method.class && matches!(visibility, Visibility::Private | Visibility::Protected) {
            return Err(CompilationError::Inaccessible {
                name: name.to_string(),
                span,
            });
        }
        Ok(())
    }

    /// Emit the value a resolved name denotes.
    pub(super) fn materialize(&mut self, resolved: Resolved<'_>, span: Span) -> Result<ExprInfo> {
        let start = self.offset();
        match resolved {
            Resolved::Local { slot, ty } => {
                self.emitter.emit_get_local(slot);
                Ok(ExprInfo::rvalue(ty, start))
            }
            Resolved::Field(field) => {
                let op = if field.is_static {
                    OpCode::GetStatic
                } else {
                    OpCode::GetField
                };
                self.emitter.emit_u16(op, field.slot);
                Ok(ExprInfo::rvalue(field.ty, start))
            }
            Resolved::Constant(value) => {
                self.emitter.emit_value(&value);
                Ok(ExprInfo::constant(value, start))
            }
            Resolved::Value(info) => Ok(info),
            Resolved::MethodGroup { name, .. } => {
                Err(CompilationError::MethodGroupAsValue { name, span })
            }
            Resolved::Class(class) => Err(CompilationError::TypeAsValue {
                name: self.ctx.class_name(class),
                span,
            }),
            Resolved::Namespace(name) => Err(CompilationError::NamespaceAsValue { name, span }),
            Resolved::This => Err(CompilationError::Unsupported {
                feature: "'this' as a value".to_string(),
                span,
            }),
        }
    }
}
