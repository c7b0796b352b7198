use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Country::Table)
                    .if_not_exists()
                    .col(pk_auto(Country::Id))
                    .col(string_len_uniq(Country::Code, 3))
                    .col(string_null(Country::Name))
                    .to_owned(),
            )
            .await?;

        for table in [Dimension::Genre, Dimension::Actor, Dimension::Language] {
            manager
                .create_table(
                    Table::create()
                        .table(table)
                        .if_not_exists()
                        .col(pk_auto(Dimension::Id))
                        .col(string_uniq(Dimension::Name))
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(pk_auto(Movie::Id))
                    .col(string(Movie::Name))
                    .col(string(Movie::Date))
                    .col(double(Movie::Score))
                    .col(text(Movie::Overview))
                    .col(string(Movie::Status))
                    .col(double(Movie::Budget))
                    .col(double(Movie::Revenue))
                    .col(integer(Movie::CountryId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_country")
                            .from(Movie::Table, Movie::CountryId)
                            .to(Country::Table, Country::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_country_id")
                    .table(Movie::Table)
                    .col(Movie::CountryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Dimension::Language).to_owned()).await?;
        manager.drop_table(Table::drop().table(Dimension::Actor).to_owned()).await?;
        manager.drop_table(Table::drop().table(Dimension::Genre).to_owned()).await?;
        manager.drop_table(Table::drop().table(Country::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Country {
    Table,
    Id,
    Code,
    Name,
}

// Genre, actor and language share one shape: an id and a unique name.
#[derive(Clone, Copy, DeriveIden)]
enum Dimension {
    Genre,
    Actor,
    Language,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    Name,
    Date,
    Score,
    Overview,
    Status,
    Budget,
    Revenue,
    CountryId,
}
