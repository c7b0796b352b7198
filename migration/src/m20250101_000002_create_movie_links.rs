use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (link, target) in [
            (Link::MovieGenre, Target::Genre),
            (Link::MovieActor, Target::Actor),
            (Link::MovieLanguage, Target::Language),
        ] {
            let target_col = target.id_column();

            manager
                .create_table(
                    Table::create()
                        .table(link)
                        .if_not_exists()
                        .col(pk_auto(Link::Id))
                        .col(integer(Link::MovieId))
                        .col(integer(target_col))
                        .foreign_key(
                            ForeignKey::create()
                                .name(format!("fk_{}_movie", link.to_string()))
                                .from(link, Link::MovieId)
                                .to(Movie::Table, Movie::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name(format!("fk_{}_{}", link.to_string(), target.to_string()))
                                .from(link, target_col)
                                .to(target, Target::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name(format!("idx_{}_unique", link.to_string()))
                        .table(link)
                        .col(Link::MovieId)
                        .col(target_col)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Link::MovieLanguage).to_owned()).await?;
        manager.drop_table(Table::drop().table(Link::MovieActor).to_owned()).await?;
        manager.drop_table(Table::drop().table(Link::MovieGenre).to_owned()).await?;
        Ok(())
    }
}

#[derive(Clone, Copy, DeriveIden)]
enum Link {
    MovieGenre,
    MovieActor,
    MovieLanguage,
    Id,
    MovieId,
}

#[derive(Clone, Copy, DeriveIden)]
enum Target {
    Genre,
    Actor,
    Language,
    Id,
    GenreId,
    ActorId,
    LanguageId,
}

impl Target {
    fn id_column(self) -> Self {
        match self {
            Target::Genre => Target::GenreId,
            Target::Actor => Target::ActorId,
            Target::Language => Target::LanguageId,
            other => other,
        }
    }
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
}
